//! Bybit 요청 서명.
//!
//! 파라미터를 키 사전순으로 정렬해 `k1=v1&k2=v2` 형태의 정규 쿼리 문자열을 만들고,
//! 이 문자열을 그대로 HMAC-SHA256으로 서명합니다 (소문자 hex).

use crate::traits::ExchangeResult;
use crate::ExchangeError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// 요청 파라미터. `BTreeMap`이므로 순회 순서가 항상 키 사전순입니다.
pub type Params = BTreeMap<String, String>;

/// 파라미터에서 정규 쿼리 문자열 생성.
pub fn canonical_query(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// HMAC-SHA256으로 페이로드 서명.
pub fn sign_payload(payload: &str, secret: &str) -> ExchangeResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Configuration(format!("잘못된 서명 키: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// 파라미터를 정규화한 뒤 서명.
pub fn sign_params(params: &Params, secret: &str) -> ExchangeResult<String> {
    sign_payload(&canonical_query(params), secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_query_sorted() {
        let p = params(&[
            ("symbol", "BTCUSD"),
            ("api_key", "key"),
            ("timestamp", "1542434791000"),
            ("leverage", "100"),
        ]);
        assert_eq!(
            canonical_query(&p),
            "api_key=key&leverage=100&symbol=BTCUSD&timestamp=1542434791000"
        );
    }

    #[test]
    fn test_canonical_query_edge_cases() {
        assert_eq!(canonical_query(&Params::new()), "");
        assert_eq!(canonical_query(&params(&[("symbol", "BTCUSD")])), "symbol=BTCUSD");
        // 대문자는 소문자보다 앞 (바이트 순서)
        assert_eq!(canonical_query(&params(&[("b", "1"), ("B", "2")])), "B=2&b=1");
    }

    #[test]
    fn test_sign_payload() {
        let signature = sign_payload(
            "symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        )
        .unwrap();

        assert_eq!(
            signature,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_sign_params_format() {
        let signature = sign_params(&params(&[("symbol", "BTCUSD")]), "secret").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    proptest! {
        #[test]
        fn prop_signature_independent_of_insertion_order(
            pairs in proptest::collection::btree_map("[a-z_]{1,12}", "[A-Za-z0-9.,]{0,16}", 0..12),
            secret in "[A-Za-z0-9]{1,40}",
        ) {
            let forward: Params = pairs.clone().into_iter().collect();
            let mut reversed = Params::new();
            for (k, v) in pairs.into_iter().rev() {
                reversed.insert(k, v);
            }

            prop_assert_eq!(canonical_query(&forward), canonical_query(&reversed));
            prop_assert_eq!(
                sign_params(&forward, &secret).unwrap(),
                sign_params(&reversed, &secret).unwrap()
            );
        }

        #[test]
        fn prop_signature_deterministic(payload in ".{0,64}", secret in "[A-Za-z0-9]{1,40}") {
            prop_assert_eq!(
                sign_payload(&payload, &secret).unwrap(),
                sign_payload(&payload, &secret).unwrap()
            );
        }
    }
}
