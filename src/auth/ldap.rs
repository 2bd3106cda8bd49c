//! LDAP directory backed by `ldap3`.

use std::time::Duration;

use async_trait::async_trait;
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::debug;

use super::directory::{Directory, DirectoryUser};
use super::AuthError;
use crate::config::LdapConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `rc` of a bind refused for bad credentials.
const INVALID_CREDENTIALS: u32 = 49;

fn directory_error(err: ldap3::LdapError) -> AuthError {
    AuthError::Directory(err.to_string())
}

/// Users searched under `user_search_base` with a service account.
pub struct LdapDirectory {
    config: LdapConfig,
}

impl LdapDirectory {
    pub fn new(config: LdapConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<Ldap, AuthError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(CONNECT_TIMEOUT)
            .set_no_tls_verify(self.config.ignore_ssl_validation);
        let (conn, ldap) = LdapConnAsync::with_settings(settings, &self.config.url)
            .await
            .map_err(directory_error)?;
        ldap3::drive!(conn);
        Ok(ldap)
    }

    fn search_filter(&self, username: &str) -> String {
        self.config
            .user_search_filter
            .replace("{0}", &ldap_escape(username))
    }
}

fn first_value(entry: &SearchEntry, attribute: &str) -> Option<String> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .and_then(|(_, values)| values.first().cloned())
}

fn all_values(entry: &SearchEntry, attribute: &str) -> Vec<String> {
    entry
        .attrs
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
        .map(|(_, values)| values.clone())
        .unwrap_or_default()
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn find_user(&self, username: &str) -> Result<Option<DirectoryUser>, AuthError> {
        let mut ldap = self.connect().await?;
        ldap.simple_bind(&self.config.bind_dn, &self.config.bind_password)
            .await
            .and_then(|result| result.success())
            .map_err(directory_error)?;

        let filter = self.search_filter(username);
        debug!(base = %self.config.user_search_base, %filter, "Searching LDAP user");
        let (entries, _) = ldap
            .search(
                &self.config.user_search_base,
                Scope::Subtree,
                &filter,
                vec!["sAMAccountName", "uid", "memberOf"],
            )
            .await
            .and_then(|result| result.success())
            .map_err(directory_error)?;
        let _ = ldap.unbind().await;

        let Some(entry) = entries.into_iter().next() else {
            return Ok(None);
        };
        let entry = SearchEntry::construct(entry);
        let canonical = first_value(&entry, "sAMAccountName")
            .or_else(|| first_value(&entry, "uid"))
            .unwrap_or_else(|| username.to_string());

        Ok(Some(DirectoryUser {
            username: canonical,
            member_of: all_values(&entry, "memberOf"),
            dn: entry.dn,
        }))
    }

    async fn verify_password(
        &self,
        user: &DirectoryUser,
        password: &str,
    ) -> Result<bool, AuthError> {
        let mut ldap = self.connect().await?;
        let result = ldap
            .simple_bind(&user.dn, password)
            .await
            .map_err(directory_error)?;
        let _ = ldap.unbind().await;

        match result.rc {
            0 => Ok(true),
            INVALID_CREDENTIALS => {
                debug!(dn = %user.dn, "LDAP bind refused");
                Ok(false)
            }
            rc => Err(AuthError::Directory(format!(
                "bind failed with code {rc}: {}",
                result.text
            ))),
        }
    }
}
