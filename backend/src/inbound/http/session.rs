//! Session helpers keeping handlers free of cookie details.
//!
//! The backend session (user id, email, tokens and expiry) lives in the
//! private, encrypted session cookie. Handlers only see [`BackendSession`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::DateTime;
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::ports::AuthGate;
use crate::domain::{AccessToken, BackendSession, Error, RefreshToken, SessionResumption, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const EMAIL_KEY: &str = "email";
pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Access token expiry as a Unix timestamp.
pub(crate) const EXPIRES_AT_KEY: &str = "expires_at";

/// Newtype wrapper exposing backend-session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the backend session in the cookie, replacing any previous one.
    pub fn persist_session(&self, session: &BackendSession) -> Result<(), Error> {
        self.0.renew();
        self.insert(USER_ID_KEY, session.user_id.as_ref())?;
        self.insert(ACCESS_TOKEN_KEY, session.access_token.expose())?;
        self.insert_or_remove(EMAIL_KEY, session.email.as_deref())?;
        self.insert_or_remove(
            REFRESH_TOKEN_KEY,
            session.refresh_token.as_ref().map(RefreshToken::expose),
        )?;
        self.insert_or_remove(
            EXPIRES_AT_KEY,
            session.expires_at.map(|at| at.timestamp()),
        )
    }

    fn insert(&self, key: &str, value: impl Serialize) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    fn insert_or_remove(&self, key: &str, value: Option<impl Serialize>) -> Result<(), Error> {
        match value {
            Some(value) => self.insert(key, value),
            None => {
                self.0.remove(key);
                Ok(())
            }
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, Error> {
        self.0
            .get::<T>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))
    }

    /// Fetch the stored backend session, if any, without checking expiry.
    ///
    /// A cookie with a malformed user id or no token counts as signed out.
    pub fn session(&self) -> Result<Option<BackendSession>, Error> {
        let (Some(raw_id), Some(token)) = (
            self.read::<String>(USER_ID_KEY)?,
            self.read::<String>(ACCESS_TOKEN_KEY)?,
        ) else {
            return Ok(None);
        };
        let user_id = match UserId::new(raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let expires_at = self
            .read::<i64>(EXPIRES_AT_KEY)?
            .and_then(|at| DateTime::from_timestamp(at, 0));
        Ok(Some(BackendSession {
            user_id,
            email: self.read(EMAIL_KEY)?,
            access_token: AccessToken::new(token),
            refresh_token: self.read::<String>(REFRESH_TOKEN_KEY)?.map(RefreshToken::new),
            expires_at,
        }))
    }

    /// The stored session once checked against its expiry.
    ///
    /// A refreshed session replaces the stored one; a session that expired
    /// and could not be refreshed is purged and reads as signed out.
    pub async fn active_session(
        &self,
        gate: &dyn AuthGate,
    ) -> Result<Option<BackendSession>, Error> {
        let Some(stored) = self.session()? else {
            return Ok(None);
        };
        match gate.resume(stored).await {
            SessionResumption::Current(session) => Ok(Some(session)),
            SessionResumption::Refreshed(session) => {
                self.persist_session(&session)?;
                Ok(Some(session))
            }
            SessionResumption::Expired => {
                self.clear();
                Ok(None)
            }
        }
    }

    /// Drop any stored backend session.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FIXTURE_EMAIL, FIXTURE_REFRESH_TOKEN, FIXTURE_USER_ID};
    use crate::inbound::http::state::HttpState;
    use crate::inbound::http::test_utils::{fixture_state, session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::{Duration, Utc};
    use rstest::rstest;

    const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn stored_session(email: Option<&str>) -> BackendSession {
        BackendSession {
            user_id: UserId::new(USER_ID).expect("fixture id"),
            email: email.map(str::to_owned),
            access_token: AccessToken::new("jwt-token"),
            refresh_token: None,
            expires_at: None,
        }
    }

    fn expired_session(refresh: &str) -> BackendSession {
        BackendSession {
            refresh_token: Some(RefreshToken::new(refresh)),
            expires_at: DateTime::from_timestamp((Utc::now() - Duration::hours(1)).timestamp(), 0),
            ..stored_session(None)
        }
    }

    async fn describe(session: SessionContext) -> Result<HttpResponse, Error> {
        let body = match session.session()? {
            Some(s) => format!(
                "{}|{}|{}",
                s.user_id,
                s.email.unwrap_or_default(),
                s.access_token.expose()
            ),
            None => "none".to_owned(),
        };
        Ok(HttpResponse::Ok().body(body))
    }

    #[actix_web::test]
    async fn round_trips_the_backend_session() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(|session: SessionContext| async move {
                        session.persist_session(&stored_session(Some("ada@example.com")))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/get", web::get().to(describe)),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        assert_eq!(set_res.status(), StatusCode::OK);
        let cookie = session_cookie(&set_res);

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        let body = test::read_body(get_res).await;
        assert_eq!(body, format!("{USER_ID}|ada@example.com|jwt-token"));
    }

    #[actix_web::test]
    async fn no_cookie_means_no_session() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/get", web::get().to(describe)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;
        assert_eq!(test::read_body(res).await, "none");
    }

    #[actix_web::test]
    async fn tampered_user_id_counts_as_signed_out() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set-invalid",
                    web::get().to(|session: Session| async move {
                        session.insert(USER_ID_KEY, "not-a-uuid").expect("insert id");
                        session.insert(ACCESS_TOKEN_KEY, "jwt").expect("insert token");
                        HttpResponse::Ok()
                    }),
                )
                .route("/get", web::get().to(describe)),
        )
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(test::read_body(res).await, "none");
    }

    #[actix_web::test]
    async fn refresh_token_and_expiry_survive_the_cookie() {
        let stored = expired_session("refresh");
        let expected = stored.clone();
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: SessionContext| {
                        let stored = stored.clone();
                        async move {
                            session.persist_session(&stored)?;
                            Ok::<_, Error>(HttpResponse::Ok())
                        }
                    }),
                )
                .route(
                    "/get",
                    web::get().to(move |session: SessionContext| {
                        let expected = expected.clone();
                        async move {
                            assert_eq!(session.session()?, Some(expected));
                            Ok::<_, Error>(HttpResponse::Ok())
                        }
                    }),
                ),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    async fn describe_active(
        state: web::Data<HttpState>,
        session: SessionContext,
    ) -> Result<HttpResponse, Error> {
        let body = match session.active_session(state.auth_gate.as_ref()).await? {
            Some(s) => s.access_token.expose().to_owned(),
            None => "none".to_owned(),
        };
        Ok(HttpResponse::Ok().body(body))
    }

    #[rstest]
    #[case(FIXTURE_REFRESH_TOKEN, "fixture-access-token")]
    #[case("revoked", "none")]
    #[actix_web::test]
    async fn expired_sessions_are_refreshed_or_dropped(
        #[case] refresh: &'static str,
        #[case] expected: &'static str,
    ) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture_state()))
                .wrap(test_session_middleware())
                .route(
                    "/set",
                    web::get().to(move |session: SessionContext| async move {
                        session.persist_session(&expired_session(refresh))?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .route("/active", web::get().to(describe_active))
                .route("/get", web::get().to(describe)),
        )
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/active").cookie(cookie).to_request(),
        )
        .await;
        let updated = session_cookie(&res);
        assert_eq!(test::read_body(res).await, expected);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(updated).to_request(),
        )
        .await;
        let stored = test::read_body(res).await;
        if expected == "none" {
            assert_eq!(stored, "none");
        } else {
            assert_eq!(
                stored,
                format!("{FIXTURE_USER_ID}|{FIXTURE_EMAIL}|fixture-access-token")
            );
        }
    }
}
