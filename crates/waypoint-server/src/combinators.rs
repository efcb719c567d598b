//! Handler combinators.
//!
//! [`fallback`] tries alternatives until one succeeds; [`validate`] runs
//! checks until one fails. Both return a [`Handler`] that can be routed or
//! registered as a group validator.
//!
//! ```rust
//! use http::StatusCode;
//! use waypoint_core::{Context, Outcome};
//! use waypoint_server::{fallback, handler, Request};
//!
//! let from_header = handler(|req, _ctx| match req.headers().get("x-user") {
//!     Some(_) => Outcome::accept(StatusCode::OK),
//!     None => Outcome::reject(StatusCode::UNAUTHORIZED),
//! });
//! let anonymous = handler(|_req, ctx| {
//!     ctx.put("user", "anonymous");
//!     Outcome::accept(StatusCode::OK)
//! });
//!
//! let auth = fallback(vec![from_header, anonymous]);
//! let req = Request::new(bytes::Bytes::new());
//! let mut ctx = Context::new();
//! assert!(auth(&req, &mut ctx).is_ok());
//! assert_eq!(ctx.get("user").and_then(|v| v.str()), Some("anonymous"));
//! ```

use waypoint_core::Outcome;

use crate::handler::{handler, Handler};

/// Runs `handlers` in order and returns the first successful outcome.
///
/// When every handler fails the last failure is returned. With no handlers
/// the result is [`Outcome::next`], which counts as success.
#[must_use]
pub fn fallback(handlers: Vec<Handler>) -> Handler {
    handler(move |req, ctx| {
        let mut outcome = Outcome::next();
        for h in &handlers {
            outcome = h(req, ctx);
            if outcome.is_ok() {
                return outcome;
            }
        }
        outcome
    })
}

/// Runs `handlers` in order and returns the first failure unchanged.
///
/// When every handler succeeds the result is a `200 OK` carrying the
/// (possibly updated) context.
#[must_use]
pub fn validate(handlers: Vec<Handler>) -> Handler {
    handler(move |req, ctx| {
        for h in &handlers {
            let outcome = h(req, ctx);
            if outcome.is_err() {
                return outcome;
            }
        }
        Outcome::ok(ctx.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Request;
    use bytes::Bytes;
    use http::StatusCode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use waypoint_core::{Context, OutcomeKind};

    fn run(h: &Handler) -> (Outcome, Context) {
        let req = Request::new(Bytes::new());
        let mut ctx = Context::new();
        let outcome = h(&req, &mut ctx);
        (outcome, ctx)
    }

    fn counted(counter: &Arc<AtomicUsize>, outcome: fn() -> Outcome) -> Handler {
        let counter = Arc::clone(counter);
        handler(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            outcome()
        })
    }

    #[test]
    fn test_fallback_empty_is_next() {
        let (outcome, _) = run(&fallback(Vec::new()));
        assert_eq!(outcome.kind(), OutcomeKind::Continue);
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_fallback_stops_at_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let h = fallback(vec![
            counted(&calls, || Outcome::text_ok(StatusCode::OK, "first")),
            counted(&calls, || Outcome::text_ok(StatusCode::OK, "second")),
        ]);

        let (outcome, _) = run(&h);
        assert_eq!(outcome.payload().downcast_ref::<&str>(), Some(&"first"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_tries_next_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let h = fallback(vec![
            counted(&calls, || Outcome::reject(StatusCode::UNAUTHORIZED)),
            counted(&calls, || Outcome::accept(StatusCode::ACCEPTED)),
        ]);

        let (outcome, _) = run(&h);
        assert_eq!(outcome.status(), Some(StatusCode::ACCEPTED));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fallback_returns_last_failure() {
        let h = fallback(vec![
            handler(|_, _| Outcome::reject(StatusCode::UNAUTHORIZED)),
            handler(|_, _| Outcome::reject(StatusCode::FORBIDDEN)),
        ]);

        let (outcome, _) = run(&h);
        assert!(outcome.is_err());
        assert_eq!(outcome.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn test_validate_empty_is_ok() {
        let (outcome, _) = run(&validate(Vec::new()));
        assert_eq!(outcome.status(), Some(StatusCode::OK));
        assert!(outcome.payload().downcast_ref::<Context>().is_some());
    }

    #[test]
    fn test_validate_short_circuits_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let h = validate(vec![
            counted(&calls, || Outcome::err(StatusCode::BAD_REQUEST, "missing id")),
            counted(&calls, || Outcome::accept(StatusCode::OK)),
        ]);

        let (outcome, _) = run(&h);
        assert_eq!(outcome.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(outcome.payload().downcast_ref::<&str>(), Some(&"missing id"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate_carries_context() {
        let h = validate(vec![
            handler(|_, ctx| {
                ctx.put("step", 1_i64);
                Outcome::accept(StatusCode::OK)
            }),
            handler(|_, ctx| {
                ctx.put("checked", true);
                Outcome::next()
            }),
        ]);

        let (outcome, ctx) = run(&h);
        assert!(outcome.is_ok());
        let carried = outcome.payload().downcast_ref::<Context>().unwrap();
        assert_eq!(carried.len(), 2);
        assert_eq!(ctx.get("checked").and_then(|v| v.bool()), Some(true));
    }
}
