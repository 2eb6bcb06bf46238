//! `otpauth://` provisioning URIs for authenticator apps.

use url::form_urlencoded::byte_serialize;

use crate::rfc6238::Totp;

fn query_escape(s: &str) -> String {
  byte_serialize(s.as_bytes()).collect()
}

impl Totp {
  /// URI for QR code generation.
  ///
  /// `otpauth://totp/<label>?secret=..&issuer=..&algorithm=..[&digits=..][&period=..]`,
  /// with digits and period left out at their usual values (6 and 30) and the
  /// issuer left out when empty.
  pub fn uri(&self, label: &str, issuer: &str) -> String {
    // Google Authenticator rejects '=' padding in the secret
    let mut params = vec![format!("secret={}", self.secret().replace('=', ""))];
    if !issuer.is_empty() {
      params.push(format!("issuer={}", query_escape(issuer)));
    }
    params.push(format!("algorithm={}", self.algorithm()));
    if self.digits() != 6 {
      params.push(format!("digits={}", self.digits()));
    }
    if self.period() != 30 {
      params.push(format!("period={}", self.period()));
    }
    format!("otpauth://totp/{}?{}", query_escape(label), params.join("&"))
  }
}

#[cfg(test)]
mod test {
  use crate::rfc6238::{Algorithm, Totp};

  const SECRET: &str = "MySecretMySecretMySecretMySecret";
  const SECRET_B32: &str = "JV4VGZLDOJSXITLZKNSWG4TFORGXSU3FMNZGK5CNPFJWKY3SMV2A";

  fn uri(secret: &str, digits: u32, period: u64, algorithm: Algorithm) -> String {
    Totp::new(secret, digits, period, algorithm).unwrap().uri("TrustGrid", "SecureLogic")
  }

  #[test]
  fn test_uri_google_auth() {
    assert_eq!(
      uri("My1234567123412341234123412341234", 6, 30, Algorithm::SHA1),
      "otpauth://totp/TrustGrid?secret=JV4TCMRTGQ2TMNZRGIZTIMJSGM2DCMRTGQYTEMZUGEZDGNBRGIZTI&issuer=SecureLogic&algorithm=SHA1");
  }

  #[test]
  fn test_uri_admin_user() {
    assert_eq!(
      uri("trustgridadmin", 6, 30, Algorithm::SHA1),
      "otpauth://totp/TrustGrid?secret=ORZHK43UM5ZGSZDBMRWWS3Q&issuer=SecureLogic&algorithm=SHA1");
  }

  #[test]
  fn test_uri_algorithms() {
    for (algorithm, name) in [(Algorithm::SHA1, "SHA1"), (Algorithm::SHA256, "SHA256"), (Algorithm::SHA512, "SHA512")] {
      assert_eq!(
        uri(SECRET, 6, 30, algorithm),
        format!("otpauth://totp/TrustGrid?secret={}&issuer=SecureLogic&algorithm={}", SECRET_B32, name));
    }
  }

  #[test]
  fn test_uri_digits_period() {
    assert_eq!(
      uri(SECRET, 4, 60, Algorithm::SHA1),
      format!("otpauth://totp/TrustGrid?secret={}&issuer=SecureLogic&algorithm=SHA1&digits=4&period=60", SECRET_B32));
    assert_eq!(
      uri(SECRET, 8, 30, Algorithm::SHA1),
      format!("otpauth://totp/TrustGrid?secret={}&issuer=SecureLogic&algorithm=SHA1&digits=8", SECRET_B32));
  }

  #[test]
  fn test_uri_escaping() {
    let totp = Totp::new(SECRET, 6, 30, Algorithm::SHA1).unwrap();
    assert_eq!(
      totp.uri("alice@example.com", "Acme & Co"),
      format!("otpauth://totp/alice%40example.com?secret={}&issuer=Acme+%26+Co&algorithm=SHA1", SECRET_B32));
    assert_eq!(
      totp.uri("bob", ""),
      format!("otpauth://totp/bob?secret={}&algorithm=SHA1", SECRET_B32));
  }
}
