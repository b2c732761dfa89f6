//! Unit tests for extractor module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::SignalField;
    use crate::types::CoinPair;
    use rust_decimal_macros::dec;

    fn registry() -> SourceRegistry {
        SourceRegistry::builtin().unwrap()
    }

    fn extract(
        source_id: &str,
        text: &str,
    ) -> Result<crate::types::Signal, crate::error::ExtractionError> {
        let registry = registry();
        let source = registry.get(source_id).expect("source registered");
        source.extractor.extract(text)
    }

    #[test]
    fn test_builtin_registry_has_seven_sources() {
        let registry = registry();
        assert_eq!(registry.len(), 7);
        assert_eq!(
            registry.ids(),
            vec![
                "AltWhaleAlerts",
                "BittrexFlashSignals",
                "CryptoLionSignals",
                "PumpRadarVIP",
                "SatoshiCallz",
                "VipCryptoZ",
                "cryptobullet",
            ]
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = registry();
        assert!(registry.get("VipCryptoZ").is_some());
        assert!(registry.get("vipcryptoz").is_none());
        assert!(registry.get("CryptoBullet").is_none());
    }

    #[test]
    fn test_vip_crypto_z_satoshi_scaled_with_derived_stop() {
        let signal = extract("VipCryptoZ", "#SLR\nBUY 5590\nSell 6100-6700-7800").unwrap();

        assert_eq!(signal.coin_pair, CoinPair::btc("SLR").unwrap());
        assert_eq!(signal.buy_price, dec!(0.0000559));
        assert_eq!(signal.targets, vec![dec!(0.000061), dec!(0.000067)]);
        assert_eq!(signal.stop_loss, dec!(0.00005031));
        assert_eq!(Some(signal.stop_loss), derive_stop_loss(signal.buy_price));
    }

    #[test]
    fn test_vip_crypto_z_explicit_stop_loss() {
        let text = "#SLR\nBUY: 5590\nSell: 6100 - 6700\nStop loss: 5000";
        let signal = extract("VipCryptoZ", text).unwrap();
        assert_eq!(signal.stop_loss, dec!(0.00005));
    }

    #[test]
    fn test_crypto_bullet_decimal_with_explicit_stop() {
        let text = "👉VIB/BTC\nBUY:  0.00001663\nTARGET1:  0.00001831\nTARGET2:  0.00002073\nSTOP LOSS:  0.00001421";
        let signal = extract("cryptobullet", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "VIB");
        assert_eq!(signal.coin_pair.main, "BTC");
        assert_eq!(signal.buy_price, dec!(0.00001663));
        assert_eq!(signal.targets, vec![dec!(0.00001831), dec!(0.00002073)]);
        assert_eq!(signal.stop_loss, dec!(0.00001421));
    }

    #[test]
    fn test_crypto_bullet_third_target() {
        let text = "ZEC/BTC\nBUY: 0.04\nTARGET1: 0.042\nTARGET2: 0.044\nTARGET3: 0.05\nSTOP LOSS: 0.037";
        let signal = extract("cryptobullet", text).unwrap();
        assert_eq!(signal.targets, vec![dec!(0.042), dec!(0.044), dec!(0.05)]);
    }

    #[test]
    fn test_crypto_bullet_missing_stop_loss_fails() {
        let text = "VIB/BTC\nBUY: 0.00001663\nTARGET1: 0.00001831";
        let err = extract("cryptobullet", text).unwrap_err();
        assert_eq!(err.field, SignalField::StopLoss);
        assert_eq!(err.source_id, "cryptobullet");
    }

    #[test]
    fn test_missing_buy_price_names_field() {
        let err = extract("VipCryptoZ", "#SLR\nSell 6100-6700").unwrap_err();
        assert_eq!(err.field, SignalField::BuyPrice);
        assert!(err.to_string().contains("buy price"));
        assert_eq!(err.pattern.as_deref(), Some(r"(?i)BUY[\s:]*([\d.]+)"));
    }

    #[test]
    fn test_missing_coin_pair_fails_first() {
        let err = extract("CryptoLionSignals", "Buy price 0.1 - 0.2").unwrap_err();
        assert_eq!(err.field, SignalField::CoinPair);
    }

    #[test]
    fn test_crypto_lion_takes_upper_buy_and_derives_stop() {
        let text = "#ADA\nBuy price 0.00002400 - 0.00002450\nSell price 0.00002700 - 0.00002900";
        let signal = extract("CryptoLionSignals", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "ADA");
        assert_eq!(signal.buy_price, dec!(0.00002450));
        assert_eq!(signal.targets, vec![dec!(0.00002700), dec!(0.00002900)]);
        assert_eq!(signal.stop_loss, dec!(0.00002205));
    }

    #[test]
    fn test_bittrex_flash_remaps_bcash_alias() {
        let text = "Coin: bcash\nEntry: 0.0950\nTake profit: 0.1000 / 0.1100 / 0.1250\nStop: 0.0850";
        let signal = extract("BittrexFlashSignals", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "BCC");
        assert_eq!(signal.buy_price, dec!(0.0950));
        assert_eq!(signal.targets, vec![dec!(0.1), dec!(0.11), dec!(0.125)]);
        assert_eq!(signal.stop_loss, dec!(0.085));
    }

    #[test]
    fn test_bittrex_flash_uppercases_symbol() {
        let text = "Coin: #omg\nEntry: 0.0015\nTake profit: 0.0017\nStop loss: 0.0013";
        let signal = extract("BittrexFlashSignals", text).unwrap();
        assert_eq!(signal.coin_pair.alt, "OMG");
        assert_eq!(signal.targets, vec![dec!(0.0017)]);
    }

    #[test]
    fn test_satoshi_callz_scales_every_price() {
        let text = "$NEO buy at 520000 sell at 560000 & 600000 stop 480000";
        let signal = extract("SatoshiCallz", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "NEO");
        assert_eq!(signal.buy_price, dec!(0.0052));
        assert_eq!(signal.targets, vec![dec!(0.0056), dec!(0.006)]);
        assert_eq!(signal.stop_loss, dec!(0.0048));
    }

    #[test]
    fn test_satoshi_scale_keeps_decimal_literals() {
        let text = "$NEO buy @ 0.0052 sell @ 0.0056 stop @ 0.0048";
        let signal = extract("SatoshiCallz", text).unwrap();
        assert_eq!(signal.buy_price, dec!(0.0052));
    }

    #[test]
    fn test_alt_whale_zone_and_optional_stop() {
        let text = "BTC-ADX\nBuy zone: 0.000245 - 0.000250\nTargets: 0.000270, 0.000290, 0.000320\nSL: 0.000230";
        let signal = extract("AltWhaleAlerts", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "ADX");
        assert_eq!(signal.buy_price, dec!(0.000250));
        assert_eq!(signal.targets.len(), 3);
        assert_eq!(signal.stop_loss, dec!(0.000230));

        let without_stop = "BTC-ADX\nBuy zone: 0.000250\nTargets: 0.000270";
        let signal = extract("AltWhaleAlerts", without_stop).unwrap();
        assert_eq!(signal.stop_loss, dec!(0.000225));
    }

    #[test]
    fn test_pump_radar_keeps_first_three_targets() {
        let text = "🚀 Pump Radar: OMG/BTC 🚀\nBuy below 0.00150\nSell: 0.00165 0.00180 0.00200 0.00250";
        let signal = extract("PumpRadarVIP", text).unwrap();

        assert_eq!(signal.coin_pair.alt, "OMG");
        assert_eq!(signal.targets, vec![dec!(0.00165), dec!(0.00180), dec!(0.00200)]);
        assert_eq!(signal.stop_loss, dec!(0.00135));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "#SLR\nBUY 5590\nSell 6100-6700-7800";
        let first = extract("VipCryptoZ", text).unwrap();
        let second = extract("VipCryptoZ", text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let err = extract("VipCryptoZ", "#SLR\nBUY 0\nSell 6100-6700").unwrap_err();
        assert_eq!(err.field, SignalField::BuyPrice);
    }

    #[test]
    fn test_derived_stop_without_buy_step_fails() {
        let extractor = PatternExtractor::new(
            "broken",
            PriceScale::Decimal,
            vec![Step::stop_loss(StopLossRule::Derived)],
        );
        let err = extractor.extract("anything").unwrap_err();
        assert_eq!(err.field, SignalField::StopLoss);
    }

    #[test]
    fn test_price_scale_parse() {
        assert_eq!(PriceScale::Satoshi.parse("5590"), Some(dec!(0.0000559)));
        assert_eq!(PriceScale::Satoshi.parse("0.001"), Some(dec!(0.001)));
        assert_eq!(PriceScale::Decimal.parse("0.001."), Some(dec!(0.001)));
        assert_eq!(PriceScale::Decimal.parse("5590"), Some(dec!(5590)));
        assert_eq!(PriceScale::Decimal.parse("."), None);
        assert_eq!(PriceScale::Decimal.parse("0"), None);
    }

    #[test]
    fn test_derive_stop_loss_rounds_to_eight_places() {
        assert_eq!(derive_stop_loss(dec!(0.00000013)), Some(dec!(0.00000012)));
        assert_eq!(derive_stop_loss(dec!(1)), Some(dec!(0.9)));
    }

    #[test]
    fn test_derive_stop_loss_below_one_satoshi_is_none() {
        assert_eq!(derive_stop_loss(dec!(0.000000005)), None);
        assert_eq!(derive_stop_loss(dec!(0.00000001)), Some(dec!(0.00000001)));
    }

    #[test]
    fn test_derived_stop_loss_that_rounds_to_zero_fails() {
        let err = extract("VipCryptoZ", "#SLR\nBUY 0.000000005\nSell 6100-6700").unwrap_err();
        assert_eq!(err.field, SignalField::StopLoss);

        let text = "OMG/BTC\nBuy below 0.000000001\nSell: 0.00165";
        let err = extract("PumpRadarVIP", text).unwrap_err();
        assert_eq!(err.field, SignalField::StopLoss);
    }
}
