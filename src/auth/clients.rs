use std::fmt;

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::Deserialize;
use serde_json::Value;

use crate::{AppResult, GetField};

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    pub fn id(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Github => "github.com",
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone)]
pub struct Clients {
    pub(crate) firebase_idpurl: String,
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Config shape: `{"firebase": {"apikey": ...}, "google": {"client_id":
    /// ..., "client_secret": ...}, "github": {...}}`, providers optional.
    pub fn from_json(json: Value) -> AppResult<Clients> {
        let firebase_idpurl = format!(
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp?key={}",
            json.get_obj_field("firebase")?.get_str_field("apikey")?
        );
        let base_url = dotenv::var("BASE_URL").unwrap_or("http://localhost:8080".to_owned());

        let google_client = provider_client(
            &json,
            "google",
            "https://accounts.google.com/o/oauth2/auth",
            "https://oauth2.googleapis.com/token",
            &base_url,
        )?;
        let github_client = provider_client(
            &json,
            "github",
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
            &base_url,
        )?;

        Ok(Clients {
            firebase_idpurl,
            google_client,
            github_client,
        })
    }

    /// No providers configured; every login attempt reports the missing keys.
    pub fn disabled() -> Clients {
        Clients {
            firebase_idpurl: String::new(),
            google_client: None,
            github_client: None,
        }
    }

    pub fn get_client(&self, provider: ClientProvider) -> AppResult<HappyClient> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }.ok_or(format!("OAuth provider {provider} keys not supplied").into())
    }
}

fn provider_client(
    json: &Value,
    key: &str,
    auth_url: &str,
    token_url: &str,
    base_url: &str,
) -> AppResult<Option<HappyClient>> {
    let Some(json) = json.get(key) else {
        return Ok(None);
    };

    let client_id = ClientId::new(json.get_str_field("client_id")?);
    let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

    let auth_url = AuthUrl::new(auth_url.to_owned())?;
    let token_url = TokenUrl::new(token_url.to_owned())?;
    let redirect_url = RedirectUrl::new(format!("{base_url}/lockin/{key}"))?;

    Ok(Some(
        BasicClient::new(client_id)
            .set_client_secret(client_secret)
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url),
    ))
}
