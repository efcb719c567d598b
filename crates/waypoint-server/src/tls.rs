//! TLS material loading.

use std::path::Path;
use std::sync::Arc;

use rustls::ServerConfig;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::TlsAcceptor;

use crate::error::{ServerError, ServerResult};

/// Builds a TLS acceptor from a PEM certificate chain and a PEM private key.
///
/// The acceptor advertises `http/1.1` through ALPN.
pub fn load_acceptor(cert: impl AsRef<Path>, key: impl AsRef<Path>) -> ServerResult<TlsAcceptor> {
    let config = load_server_config(cert.as_ref(), key.as_ref())?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_server_config(cert: &Path, key: &Path) -> ServerResult<ServerConfig> {
    let chain = CertificateDer::pem_file_iter(cert)
        .map_err(|e| ServerError::tls_material(cert, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::tls_material(cert, e))?;
    if chain.is_empty() {
        return Err(ServerError::tls_material(cert, "no certificate found"));
    }

    let key_der = PrivateKeyDer::from_pem_file(key).map_err(|e| ServerError::tls_material(key, e))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(chain, key_der)?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_certificate_file() {
        let err = load_acceptor("/nonexistent/server.crt", "/nonexistent/server.key").err().unwrap();
        assert!(matches!(err, ServerError::TlsMaterial { ref path, .. } if path.ends_with("server.crt")));
    }

    #[test]
    fn test_certificate_file_without_pem_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("server.crt");
        let key = dir.path().join("server.key");
        fs::write(&cert, "not a certificate").unwrap();
        fs::write(&key, "not a key").unwrap();

        let err = load_acceptor(&cert, &key).err().unwrap();
        assert!(err.to_string().contains("no certificate found"));
    }
}
