// src/api/middleware/auth.rs

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use crate::api::utils::{parse_bearer, BearerToken};
use crate::core::keyring::Keyring;
use log::{debug, warn, error};

// Rejects requests without a live session and stores the caller's identity
// in request extensions
pub struct TokenValidator;

impl<S, B> Transform<S, ServiceRequest> for TokenValidator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenValidatorMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenValidatorMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct TokenValidatorMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TokenValidatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        // CORS preflight passes straight through
        if req.method() == actix_web::http::Method::OPTIONS {
            let fut = service.call(req);
            return Box::pin(async move { fut.await });
        }

        Box::pin(async move {
            let token = match req.headers().get("Authorization").map(|h| h.to_str()) {
                Some(Ok(header_str)) => match parse_bearer(header_str) {
                    Some(token) => token.to_string(),
                    None => {
                        warn!("Invalid authorization header format");
                        return Err(actix_web::error::ErrorUnauthorized("Invalid authorization header format"));
                    }
                },
                Some(Err(_)) => {
                    warn!("Could not convert authorization header to string");
                    return Err(actix_web::error::ErrorUnauthorized("Invalid authorization header"));
                }
                None => {
                    warn!("Missing authorization header");
                    return Err(actix_web::error::ErrorUnauthorized("Missing authorization header"));
                }
            };

            let keyring = match req.app_data::<web::Data<Arc<Keyring>>>() {
                Some(keyring) => keyring.clone(),
                None => {
                    error!("Keyring is not registered as app data");
                    return Err(actix_web::error::ErrorInternalServerError("Server misconfigured"));
                }
            };

            match keyring.identify(&token) {
                Ok(identity) => {
                    debug!("Token valid for account {}", identity.user_id);
                    req.extensions_mut().insert(BearerToken(token));
                    req.extensions_mut().insert(identity);
                    service.call(req).await
                }
                Err(e) => {
                    warn!("Token validation failed: {}", e);
                    Err(actix_web::error::ErrorUnauthorized(format!("Invalid or expired token: {}", e)))
                }
            }
        })
    }
}
