// SPDX-FileCopyrightText: 2026 Ludex Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential persistence, one table per platform family.
//!
//! Steam stores only the linked external id, Xbox a static gateway API key,
//! PSN and Epic full OAuth token pairs refreshed in place.

use rusqlite::params;

use ludex_core::types::Platform;
use ludex_core::LudexError;

use crate::database::{map_tr_err, Database};
use crate::models::{parse_opt_ts, parse_ts, ts, Credential, CredentialMaterial, TokenPair};

/// Fetch the stored credential for (user, platform), if any.
pub async fn get_credential(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<Option<Credential>, LudexError> {
    let user = user_id.to_string();
    match platform {
        Platform::Steam => {
            db.connection()
                .call(move |conn| {
                    let result = conn.query_row(
                        "SELECT steam_id FROM steam_links WHERE user_id = ?1",
                        params![user],
                        |row| row.get::<_, String>(0),
                    );
                    match result {
                        Ok(steam_id) => Ok(Some(Credential {
                            user_id: user,
                            platform: Platform::Steam,
                            material: CredentialMaterial::SteamId { steam_id },
                        })),
                        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                        Err(e) => Err(e),
                    }
                })
                .await
                .map_err(map_tr_err)
        }
        Platform::Xbox => {
            db.connection()
                .call(move |conn| {
                    let result = conn.query_row(
                        "SELECT api_key FROM xbox_tokens WHERE user_id = ?1",
                        params![user],
                        |row| row.get::<_, String>(0),
                    );
                    match result {
                        Ok(api_key) => Ok(Some(Credential {
                            user_id: user,
                            platform: Platform::Xbox,
                            material: CredentialMaterial::ApiKey { api_key },
                        })),
                        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                        Err(e) => Err(e),
                    }
                })
                .await
                .map_err(map_tr_err)
        }
        Platform::Psn | Platform::Epic => get_token_pair(db, user_id, platform).await,
    }
}

fn token_table(platform: Platform) -> &'static str {
    match platform {
        Platform::Psn => "psn_tokens",
        Platform::Epic => "epic_tokens",
        // Callers route Steam/Xbox to their own tables before reaching here.
        Platform::Steam | Platform::Xbox => unreachable!("no token table for {platform}"),
    }
}

async fn get_token_pair(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<Option<Credential>, LudexError> {
    let user = user_id.to_string();
    let sql = format!(
        "SELECT access_token, refresh_token, expires_at, refresh_expires_at, account_id \
         FROM {} WHERE user_id = ?1",
        token_table(platform)
    );
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(&sql, params![user], |row| {
                Ok(TokenPair {
                    access_token: row.get(0)?,
                    refresh_token: row.get(1)?,
                    expires_at: parse_ts(2, row.get(2)?)?,
                    refresh_expires_at: parse_opt_ts(3, row.get(3)?)?,
                    account_id: row.get(4)?,
                })
            });
            match result {
                Ok(pair) => Ok(Some(Credential {
                    user_id: user,
                    platform,
                    material: CredentialMaterial::OAuthTokens(pair),
                })),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the stored credential for (user, platform).
pub async fn save_credential(db: &Database, credential: &Credential) -> Result<(), LudexError> {
    let credential = credential.clone();
    match (&credential.material, credential.platform) {
        (CredentialMaterial::SteamId { steam_id }, Platform::Steam) => {
            let (user, steam_id) = (credential.user_id.clone(), steam_id.clone());
            db.connection()
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        "INSERT OR REPLACE INTO steam_links (user_id, steam_id) VALUES (?1, ?2)",
                        params![user, steam_id],
                    )?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)
        }
        (CredentialMaterial::ApiKey { api_key }, Platform::Xbox) => {
            let (user, api_key) = (credential.user_id.clone(), api_key.clone());
            db.connection()
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        "INSERT OR REPLACE INTO xbox_tokens (user_id, api_key) VALUES (?1, ?2)",
                        params![user, api_key],
                    )?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)
        }
        (CredentialMaterial::OAuthTokens(pair), platform @ (Platform::Psn | Platform::Epic)) => {
            let user = credential.user_id.clone();
            let pair = pair.clone();
            let sql = format!(
                "INSERT OR REPLACE INTO {} \
                 (user_id, access_token, refresh_token, expires_at, refresh_expires_at, \
                 account_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                token_table(platform)
            );
            db.connection()
                .call(move |conn| -> Result<(), rusqlite::Error> {
                    conn.execute(
                        &sql,
                        params![
                            user,
                            pair.access_token,
                            pair.refresh_token,
                            ts(pair.expires_at),
                            pair.refresh_expires_at.map(ts),
                            pair.account_id,
                        ],
                    )?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)
        }
        (material, platform) => Err(LudexError::Validation(format!(
            "credential material {material:?} does not match platform {platform}"
        ))),
    }
}

/// Remove the stored credential for (user, platform).
pub async fn clear_credential(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<(), LudexError> {
    let user = user_id.to_string();
    let table = match platform {
        Platform::Steam => "steam_links",
        Platform::Xbox => "xbox_tokens",
        Platform::Psn => "psn_tokens",
        Platform::Epic => "epic_tokens",
    };
    let sql = format!("DELETE FROM {table} WHERE user_id = ?1");
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(&sql, params![user])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn steam_link_round_trips() {
        let db = setup_db().await;
        let cred = Credential {
            user_id: "local".into(),
            platform: Platform::Steam,
            material: CredentialMaterial::SteamId {
                steam_id: "76561198000000000".into(),
            },
        };
        save_credential(&db, &cred).await.unwrap();

        let loaded = get_credential(&db, "local", Platform::Steam)
            .await
            .unwrap()
            .expect("credential should exist");
        assert_eq!(loaded, cred);
    }

    #[tokio::test]
    async fn token_pair_refresh_replaces_in_place() {
        let db = setup_db().await;
        let now = Utc::now();
        let make = |access: &str| Credential {
            user_id: "local".into(),
            platform: Platform::Epic,
            material: CredentialMaterial::OAuthTokens(TokenPair {
                access_token: access.into(),
                refresh_token: "refresh-1".into(),
                expires_at: now + Duration::hours(2),
                refresh_expires_at: Some(now + Duration::days(14)),
                account_id: Some("epic-acct".into()),
            }),
        };
        save_credential(&db, &make("access-1")).await.unwrap();
        save_credential(&db, &make("access-2")).await.unwrap();

        let loaded = get_credential(&db, "local", Platform::Epic)
            .await
            .unwrap()
            .unwrap();
        let CredentialMaterial::OAuthTokens(pair) = loaded.material else {
            panic!("expected token pair");
        };
        assert_eq!(pair.access_token, "access-2");
        assert_eq!(pair.account_id.as_deref(), Some("epic-acct"));
    }

    #[tokio::test]
    async fn clear_removes_only_that_platform() {
        let db = setup_db().await;
        save_credential(
            &db,
            &Credential {
                user_id: "local".into(),
                platform: Platform::Xbox,
                material: CredentialMaterial::ApiKey {
                    api_key: "xbl-key".into(),
                },
            },
        )
        .await
        .unwrap();
        save_credential(
            &db,
            &Credential {
                user_id: "local".into(),
                platform: Platform::Steam,
                material: CredentialMaterial::SteamId {
                    steam_id: "7656".into(),
                },
            },
        )
        .await
        .unwrap();

        clear_credential(&db, "local", Platform::Xbox).await.unwrap();
        assert!(get_credential(&db, "local", Platform::Xbox)
            .await
            .unwrap()
            .is_none());
        assert!(get_credential(&db, "local", Platform::Steam)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn mismatched_material_is_rejected() {
        let db = setup_db().await;
        let bad = Credential {
            user_id: "local".into(),
            platform: Platform::Steam,
            material: CredentialMaterial::ApiKey {
                api_key: "not-for-steam".into(),
            },
        };
        assert!(matches!(
            save_credential(&db, &bad).await,
            Err(LudexError::Validation(_))
        ));
    }
}
