// Resource endpoints, one file per gateway resource.
//
// Each file adds inherent async methods to `ApiClient`.

mod health;
mod providers;
mod security_logs;
mod webhooks;

use tracing::warn;

use crate::error::Error;

/// Fallback for list and stats reads: a route the gateway does not serve
/// yields the empty value. Every other failure, 401 included, propagates.
pub(crate) fn or_default_if_absent<T: Default>(
    what: &'static str,
    result: Result<T, Error>,
) -> Result<T, Error> {
    match result {
        Err(e) if e.is_endpoint_absent() => {
            warn!(status = e.status(), "{what} unavailable, using empty result");
            Ok(T::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_endpoint_degrades() {
        let out: Result<Vec<u8>, Error> =
            or_default_if_absent("things", Err(Error::server(404, "Not Found")));
        assert!(matches!(out, Ok(v) if v.is_empty()));
    }

    #[test]
    fn other_failures_propagate() {
        let unauthorized: Result<Vec<u8>, Error> =
            or_default_if_absent("things", Err(Error::server(401, "Unauthorized")));
        assert!(unauthorized.is_err());

        let down: Result<Vec<u8>, Error> = or_default_if_absent("things", Err(Error::network(false)));
        assert!(down.is_err());
    }
}
