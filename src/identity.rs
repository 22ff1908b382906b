//! 匿名用户身份令牌
//!
//! 令牌格式：hex(4 字节随机 owner id || HMAC-SHA256(secret, owner id))。
//! 服务端不保存会话，只靠 HMAC 防伪造。

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::config::IdentityConfig;
use crate::errors::{LinkVaultError, Result};

type HmacSha256 = Hmac<Sha256>;

/// owner id 原始字节长度
const OWNER_ID_LEN: usize = 4;
/// HMAC-SHA256 输出长度
const MAC_LEN: usize = 32;

/// 签发与校验 owner 令牌，密钥在启动后只读
#[derive(Clone)]
pub struct OwnerTokenSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for OwnerTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerTokenSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl OwnerTokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.secret_key.as_bytes())
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| LinkVaultError::internal(format!("invalid HMAC key: {}", e)))
    }

    /// 签发新令牌
    pub fn issue(&self) -> Result<String> {
        self.issue_with_owner().map(|(token, _)| token)
    }

    /// 签发新令牌，同时返回其中的 owner id
    pub fn issue_with_owner(&self) -> Result<(String, u32)> {
        let raw: [u8; OWNER_ID_LEN] = rand::random::<u32>().to_be_bytes();
        let token = self.sign(raw)?;
        Ok((token, u32::from_be_bytes(raw)))
    }

    fn sign(&self, raw: [u8; OWNER_ID_LEN]) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(&raw);
        let signature = mac.finalize().into_bytes();

        let mut data = Vec::with_capacity(OWNER_ID_LEN + MAC_LEN);
        data.extend_from_slice(&raw);
        data.extend_from_slice(&signature);
        Ok(hex::encode(data))
    }

    /// 校验令牌签名
    ///
    /// 非法 hex 返回错误；长度不对或签名不匹配返回 `Ok(false)`。
    pub fn verify(&self, token: &str) -> Result<bool> {
        let data = hex::decode(token)?;
        if data.len() != OWNER_ID_LEN + MAC_LEN {
            debug!("Token has unexpected length {}", data.len());
            return Ok(false);
        }

        let mut mac = self.mac()?;
        mac.update(&data[..OWNER_ID_LEN]);
        // verify_slice 是常数时间比较
        Ok(mac.verify_slice(&data[OWNER_ID_LEN..]).is_ok())
    }

    /// 取出令牌中的 owner id（大端），不做签名校验
    pub fn extract_owner_id(token: &str) -> Result<u32> {
        let data = hex::decode(token)?;
        let raw: [u8; OWNER_ID_LEN] = data
            .get(..OWNER_ID_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                LinkVaultError::invalid_token(format!(
                    "token too short: {} bytes",
                    data.len()
                ))
            })?;
        Ok(u32::from_be_bytes(raw))
    }

    /// 校验后取出 owner id
    pub fn owner_from_token(&self, token: &str) -> Result<u32> {
        if !self.verify(token)? {
            return Err(LinkVaultError::invalid_token("token signature mismatch"));
        }
        Self::extract_owner_id(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let signer = OwnerTokenSigner::new("secret_key");
        let (token, owner) = signer.issue_with_owner().unwrap();

        assert_eq!(token.len(), (OWNER_ID_LEN + MAC_LEN) * 2);
        assert!(signer.verify(&token).unwrap());
        assert_eq!(OwnerTokenSigner::extract_owner_id(&token).unwrap(), owner);
        assert_eq!(signer.owner_from_token(&token).unwrap(), owner);
    }

    #[test]
    fn test_known_token() {
        let signer = OwnerTokenSigner::new("secret_key");
        let token = signer.sign([0, 0, 0, 42]).unwrap();
        assert_eq!(
            token,
            "0000002a19eb80388e341b5046f3026694c4db33563d9410447a8e4ca3011fbec71f963c"
        );
        assert_eq!(OwnerTokenSigner::extract_owner_id(&token).unwrap(), 42);
    }

    #[test]
    fn test_other_secret_rejects_token() {
        let token = OwnerTokenSigner::new("secret_key").issue().unwrap();
        let other = OwnerTokenSigner::new("another_key");
        assert!(!other.verify(&token).unwrap());
        assert!(matches!(
            other.owner_from_token(&token),
            Err(LinkVaultError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_owner_id_rejected() {
        let signer = OwnerTokenSigner::new("secret_key");
        let token = signer.sign([0, 0, 0, 42]).unwrap();
        let forged = format!("0000002b{}", &token[8..]);
        assert!(!signer.verify(&forged).unwrap());
    }

    #[test]
    fn test_malformed_hex_is_error() {
        let signer = OwnerTokenSigner::new("secret_key");
        assert!(matches!(
            signer.verify("not-a-token"),
            Err(LinkVaultError::InvalidToken(_))
        ));
        assert!(OwnerTokenSigner::extract_owner_id("xyz").is_err());
    }

    #[test]
    fn test_short_token_is_invalid_not_panic() {
        let signer = OwnerTokenSigner::new("secret_key");
        assert!(!signer.verify("0000").unwrap());
        assert!(matches!(
            OwnerTokenSigner::extract_owner_id("0000"),
            Err(LinkVaultError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = OwnerTokenSigner::new("super-secret");
        assert!(!format!("{:?}", signer).contains("super-secret"));
    }
}
