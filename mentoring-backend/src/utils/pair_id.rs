// src/utils/pair_id.rs

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// ペア識別子を鍵付きハッシュで生成する
///
/// 参加者IDの組から直接IDを推測できないよう、PAIR_ID_HASH_SECRET を鍵とした
/// HMAC-SHA256 を16進文字列で返す。同じ組からは常に同じ値になる。
#[derive(Clone)]
pub struct PairIdHasher {
    keyed: HmacSha256,
}

impl PairIdHasher {
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    pub fn pair_id(&self, mentor_id: i32, learner_id: i32) -> String {
        let mut mac = self.keyed.clone();
        mac.update(format!("{}:{}", mentor_id, learner_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
