//! Admin guard
//!
//! `/api/admin/*` 需要有效的 `auth` Cookie 且角色为 admin，登录端点除外。
//! 验证通过的 claims 放入 request extensions，处理器可直接读取。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{info, trace};

use crate::api::constants::{ADMIN_LOGIN_PATH, AUTH_COOKIE_NAME};
use crate::api::services::error_code::ErrorCode;
use crate::api::services::types::ErrorBody;
use crate::api::signed_cookie::{AuthClaims, get_cookie_signer};

/// Admin 认证中间件
#[derive(Clone, Default)]
pub struct AdminGuard;

impl<S, B> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminGuardMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct AdminGuardMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> AdminGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<EitherBody<B>> {
        req.into_response(
            HttpResponse::Unauthorized()
                .json(ErrorBody {
                    code: ErrorCode::Unauthorized,
                    error: message.to_string(),
                })
                .map_into_right_body(),
        )
    }

    fn is_login_endpoint(req: &ServiceRequest) -> bool {
        req.method() == Method::POST && req.path() == ADMIN_LOGIN_PATH
    }

    fn admin_claims(req: &ServiceRequest) -> Result<AuthClaims, &'static str> {
        let cookie = req.cookie(AUTH_COOKIE_NAME).ok_or("Not signed in")?;
        let claims = get_cookie_signer().verify(cookie.value()).map_err(|e| {
            info!("Admin cookie rejected: {}", e);
            "Invalid or expired session"
        })?;
        if !claims.is_admin() {
            info!("User {} is not an admin", claims.sub);
            return Err("Admin access required");
        }
        Ok(claims)
    }
}

impl<S, B> Service<ServiceRequest> for AdminGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            if Self::is_login_endpoint(&req) {
                trace!("Login endpoint accessed - bypassing admin guard");
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            match Self::admin_claims(&req) {
                Ok(claims) => {
                    trace!("Admin guard passed for user {}", claims.sub);
                    req.extensions_mut().insert(claims);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(message) => Ok(Self::handle_unauthorized(req, message)),
            }
        })
    }
}
