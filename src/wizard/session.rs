//! Credential flow
//!
//! Credentials come from the credential file or from the operator. They are
//! probed against `api-keys/me` until the endpoint accepts them or the
//! operator aborts, then optionally written back to the file. The same probe
//! runs again when a process finds the key refused or the endpoint gone.

use crate::client::{ImmichClient, KeyCheck};
use crate::config::Config;
use crate::console::Console;
use crate::credentials::{CredentialStore, Credentials, StoredCredentials};
use crate::error::Result;
use crate::types::ApiKeyInfo;
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// Working credentials and what the key may do
#[derive(Debug)]
pub struct Session {
    /// Credentials the session runs with
    pub credentials: Credentials,
    /// Client bound to those credentials
    pub client: ImmichClient,
    /// Key information reported by the server
    pub key: ApiKeyInfo,
}

/// Obtain working credentials
///
/// Returns `None` when the operator aborts.
pub async fn establish<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
) -> Result<Option<Session>> {
    let store = CredentialStore::new(&config.credentials_file);
    let stored = match store.load() {
        StoredCredentials::Found(creds) => Some(creds),
        StoredCredentials::Missing => {
            console.say("No key file located, proceeding to manual input")?;
            None
        }
        StoredCredentials::Unreadable(reason) => {
            console.say(format_args!(
                "Reading the key file failed ({reason}), proceeding to manual input"
            ))?;
            None
        }
    };

    let creds = match &stored {
        Some(creds) => creds.clone(),
        None => enter_credentials(console)?,
    };
    probe(console, config, &store, stored.as_ref(), creds).await
}

/// Replace a key the server stopped accepting, keeping the instance
///
/// Returns `None` when the operator aborts.
pub async fn renew_key<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    instance: &str,
) -> Result<Option<Session>> {
    if !retry_key(console)? {
        return Ok(None);
    }
    let creds = Credentials::new(instance, enter_key(console)?);
    let store = CredentialStore::new(&config.credentials_file);
    let stored = stored_quietly(&store);
    probe(console, config, &store, stored.as_ref(), creds).await
}

/// Replace instance and key after the endpoint stopped working
///
/// Returns `None` when the operator aborts.
pub async fn reconnect<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    reason: &str,
) -> Result<Option<Session>> {
    if !retry_endpoint(console, reason)? {
        return Ok(None);
    }
    let creds = enter_credentials(console)?;
    let store = CredentialStore::new(&config.credentials_file);
    let stored = stored_quietly(&store);
    probe(console, config, &store, stored.as_ref(), creds).await
}

fn stored_quietly(store: &CredentialStore) -> Option<Credentials> {
    match store.load() {
        StoredCredentials::Found(creds) => Some(creds),
        StoredCredentials::Missing | StoredCredentials::Unreadable(_) => None,
    }
}

// Probe `creds` until the endpoint accepts them or the operator aborts.
async fn probe<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &Config,
    store: &CredentialStore,
    stored: Option<&Credentials>,
    mut creds: Credentials,
) -> Result<Option<Session>> {
    loop {
        let client = match ImmichClient::new(&creds, config) {
            Ok(client) => client,
            Err(e) => {
                if !retry_endpoint(console, &e.to_string())? {
                    return Ok(None);
                }
                creds = enter_credentials(console)?;
                continue;
            }
        };

        match client.check_key().await {
            KeyCheck::Valid(key) => {
                info!(instance = %creds.instance, key = ?key.name, "credentials accepted");
                offer_save(console, store, stored, &creds)?;
                return Ok(Some(Session {
                    credentials: creds,
                    client,
                    key,
                }));
            }
            KeyCheck::Rejected => {
                warn!(instance = %creds.instance, "API key rejected");
                if !retry_key(console)? {
                    return Ok(None);
                }
                let key = enter_key(console)?;
                creds = Credentials::new(&creds.instance, key);
            }
            KeyCheck::Unreachable(reason) => {
                warn!(instance = %creds.instance, %reason, "endpoint unusable");
                if !retry_endpoint(console, &reason)? {
                    return Ok(None);
                }
                creds = enter_credentials(console)?;
            }
        }
    }
}

fn retry_key<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<bool> {
    console.say("Endpoint seems okay, but the key is not accepted. Abort or re-enter?")?;
    Ok(console.menu(&["Re-enter the API key", "Abort"])? == 1)
}

fn retry_endpoint<R: BufRead, W: Write>(console: &mut Console<R, W>, reason: &str) -> Result<bool> {
    console.say(format_args!(
        "The supplied API endpoint seems not to work ({reason}). Abort or re-enter?"
    ))?;
    Ok(console.menu(&["Re-enter API endpoint and key", "Abort"])? == 1)
}

fn enter_credentials<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<Credentials> {
    console.say("[Instance] Paste (or enter) the address of the instance API endpoint")?;
    console.say("Usually it is https://<instance>/api/")?;
    let instance = console.ask_min_len("Instance: ", 1)?;
    let key = enter_key(console)?;
    Ok(Credentials::new(instance, key))
}

fn enter_key<R: BufRead, W: Write>(console: &mut Console<R, W>) -> Result<String> {
    console.say("Paste (or enter) the API key")?;
    console.ask_min_len("API key: ", 1)
}

fn offer_save<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &CredentialStore,
    stored: Option<&Credentials>,
    creds: &Credentials,
) -> Result<()> {
    let save = format!("Save to file ('{}')", store.path().display());
    let choice = match stored {
        None => {
            console.say("Do you want to save the credentials in a file for later use?")?;
            console.menu(&[save.as_str(), "No, use them only for this session"])?
        }
        Some(old) if old != creds => {
            console.say("The credentials differ from the stored ones. Overwrite the key file?")?;
            console.menu(&[save.as_str(), "No, keep it"])?
        }
        Some(_) => return Ok(()),
    };

    if choice == 1 {
        if let Err(e) = store.save(creds) {
            warn!(error = %e, "could not save credentials");
            console.say(format_args!("Could not save the credentials: {e}"))?;
        }
    }
    Ok(())
}
