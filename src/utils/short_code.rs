//! 短链地址生成
//!
//! 地址是 `(initial_link, owner_id)` 的纯函数：
//! sha256(initial_link + owner_id 十进制) 取前 8 字节作为大端 u64，
//! 对该整数的十进制表示做 base58 编码，截取前 8 个字符。
//! owner_id 参与哈希，所以不同用户缩短同一长链接得到不同地址。

use sha2::{Digest, Sha256};
use tracing::error;

use crate::errors::{LinkVaultError, Result};

/// 生成的短链长度
pub const SHORT_LINK_LENGTH: usize = 8;

/// Bitcoin base58 字母表（去掉 0 O I l）
const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn generate_short_link(initial_link: &str, owner_id: u32) -> Result<String> {
    let digest = Sha256::digest(format!("{}{}", initial_link, owner_id).as_bytes());

    let mut leading = [0u8; 8];
    leading.copy_from_slice(&digest[..8]);
    let number = u64::from_be_bytes(leading);

    let encoded = encode_decimal(&number.to_string())?;
    if encoded.len() < SHORT_LINK_LENGTH {
        // 只有 number < 58^7 时才会发生，属于逻辑错误而非用户输入问题
        error!(
            "Encoded address '{}' shorter than {} chars for owner {}",
            encoded, SHORT_LINK_LENGTH, owner_id
        );
        return Err(LinkVaultError::internal(format!(
            "encoded address too short: {} < {}",
            encoded.len(),
            SHORT_LINK_LENGTH
        )));
    }

    Ok(encoded[..SHORT_LINK_LENGTH].to_string())
}

/// 把十进制数字串编码为 base58
///
/// 非数字字符或超出 u64 范围的输入视为内部错误。
fn encode_decimal(digits: &str) -> Result<String> {
    if digits.is_empty() {
        return Err(LinkVaultError::internal("cannot encode empty number"));
    }

    let mut value: u64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            return Err(LinkVaultError::internal(format!(
                "invalid digit {:?} in {:?}",
                b as char, digits
            )));
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
            .ok_or_else(|| LinkVaultError::internal(format!("number overflows u64: {}", digits)))?;
    }

    if value == 0 {
        return Ok((BASE58_ALPHABET[0] as char).to_string());
    }

    let mut out = Vec::with_capacity(11);
    while value > 0 {
        out.push(BASE58_ALPHABET[(value % 58) as usize]);
        value /= 58;
    }
    out.reverse();

    // 字母表全部是 ASCII
    Ok(out.into_iter().map(char::from).collect())
}
