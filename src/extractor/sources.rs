//! Message formats of the known signal channels
//!
//! Each channel writes its calls in its own free-text layout, so each gets its
//! own ordered step list. Sample posts are kept next to the definitions.

use super::pattern::{PatternExtractor, PriceScale, Step, StopLossRule, TargetRule};
use super::registry::SourceDefinition;
use crate::error::Result;
use crate::types::Exchange;

/// All built-in source definitions
pub fn builtin() -> Result<Vec<SourceDefinition>> {
    Ok(vec![
        crypto_bullet()?,
        crypto_lion_signals()?,
        vip_crypto_z()?,
        bittrex_flash_signals()?,
        satoshi_callz()?,
        alt_whale_alerts()?,
        pump_radar_vip()?,
    ])
}

/// ```text
/// 👉VIB/BTC
/// BUY:  0.00001663
/// TARGET1:  0.00001831
/// TARGET2:  0.00002073
/// STOP LOSS:  0.00001421
/// ```
fn crypto_bullet() -> Result<SourceDefinition> {
    let id = "cryptobullet";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Decimal,
        vec![
            Step::coin_pair(r"([A-Z]{3,5})/([A-Z]{3,5})")?,
            Step::buy_price(r"BUY:\s*([\d.]+)")?,
            Step::targets(TargetRule::numbered(
                r"TARGET1:\s*([\d.]+)",
                &[r"TARGET2:\s*([\d.]+)", r"TARGET3:\s*([\d.]+)"],
            )?),
            Step::stop_loss(StopLossRule::explicit(r"STOP LOSS:\s*([\d.]+)")?),
        ],
    );
    Ok(SourceDefinition::new(id, "CryptoBullet (Bittrex)", Exchange::Bittrex, extractor))
}

/// ```text
/// #ADA
/// Buy price 0.00002400 - 0.00002450
/// Sell price 0.00002700 - 0.00002900
/// ```
fn crypto_lion_signals() -> Result<SourceDefinition> {
    let id = "CryptoLionSignals";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Decimal,
        vec![
            Step::coin_pair(r"#([A-Z]{3,5})")?,
            Step::buy_price(r"Buy price\s*[\d.]+ - ([\d.]+)")?,
            Step::targets(TargetRule::groups(r"Sell price\s*([\d.]+) - ([\d.]+)")?),
            Step::stop_loss(StopLossRule::Derived),
        ],
    );
    Ok(SourceDefinition::new(
        id,
        "CryptoLionSignals (Bittrex)",
        Exchange::Bittrex,
        extractor,
    ))
}

/// ```text
/// #SLR
/// BUY 5590
/// Sell 6100-6700-7800
/// ```
fn vip_crypto_z() -> Result<SourceDefinition> {
    let id = "VipCryptoZ";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Satoshi,
        vec![
            Step::coin_pair(r"#([A-Z]{3,5})")?,
            Step::buy_price(r"(?i)BUY[\s:]*([\d.]+)")?,
            Step::targets(TargetRule::groups(r"(?i)Sell[\s:]*([\d.]+)[\s-]*([\d.]+)")?),
            Step::stop_loss(StopLossRule::or_derived(r"(?i)STOP LOSS?[\s:]*([\d.]+)")?),
        ],
    );
    Ok(SourceDefinition::new(id, "VipCryptoZ (Bittrex)", Exchange::Bittrex, extractor))
}

/// ```text
/// Coin: bcash
/// Entry: 0.0950
/// Take profit: 0.1000 / 0.1100 / 0.1250
/// Stop: 0.0850
/// ```
fn bittrex_flash_signals() -> Result<SourceDefinition> {
    let id = "BittrexFlashSignals";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Decimal,
        vec![
            Step::coin_pair_with_aliases(r"(?i)Coin:\s*#?([a-z]{3,5})\b", &[("bcash", "BCC")])?,
            Step::buy_price(r"(?i)Entry:\s*([\d.]+)")?,
            Step::targets(TargetRule::list(
                r"(?i)Take profit:\s*([\d.]+(?:[ \t]*[/,&][ \t]*[\d.]+)*)",
            )?),
            Step::stop_loss(StopLossRule::explicit(r"(?i)Stop(?:[ \t]*loss)?:\s*([\d.]+)")?),
        ],
    );
    Ok(SourceDefinition::new(
        id,
        "Bittrex Flash Signals",
        Exchange::Bittrex,
        extractor,
    ))
}

/// ```text
/// $NEO buy at 520000 sell at 560000 & 600000 stop 480000
/// ```
fn satoshi_callz() -> Result<SourceDefinition> {
    let id = "SatoshiCallz";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Satoshi,
        vec![
            Step::coin_pair(r"\$([A-Z]{3,5})\b")?,
            Step::buy_price(r"(?i)\bbuy\s*(?:at|@)\s*([\d.]+)")?,
            Step::targets(TargetRule::list(
                r"(?i)\bsell\s*(?:at|@)\s*([\d.]+(?:[ \t]*[&,/][ \t]*[\d.]+)*)",
            )?),
            Step::stop_loss(StopLossRule::explicit(
                r"(?i)\bstop(?:[ \t]*loss)?[ \t]*(?:at|@)?[ \t]*([\d.]+)",
            )?),
        ],
    );
    Ok(SourceDefinition::new(id, "Satoshi Callz", Exchange::Bittrex, extractor))
}

/// ```text
/// BTC-ADX
/// Buy zone: 0.000245 - 0.000250
/// Targets: 0.000270, 0.000290, 0.000320
/// SL: 0.000230
/// ```
fn alt_whale_alerts() -> Result<SourceDefinition> {
    let id = "AltWhaleAlerts";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Decimal,
        vec![
            Step::coin_pair(r"BTC[-/]([A-Z]{3,5})\b")?,
            Step::buy_price(r"(?i)Buy zone:\s*(?:[\d.]+[ \t]*-[ \t]*)?([\d.]+)")?,
            Step::targets(TargetRule::list(
                r"(?i)Targets?:\s*([\d.]+(?:[ \t]*[,/][ \t]*[\d.]+)*)",
            )?),
            Step::stop_loss(StopLossRule::or_derived(r"(?i)\bSL:\s*([\d.]+)")?),
        ],
    );
    Ok(SourceDefinition::new(
        id,
        "Alt Whale Alerts (Bittrex)",
        Exchange::Bittrex,
        extractor,
    ))
}

/// ```text
/// 🚀 Pump Radar: OMG/BTC 🚀
/// Buy below 0.00150
/// Sell: 0.00165 0.00180 0.00200 0.00250
/// ```
fn pump_radar_vip() -> Result<SourceDefinition> {
    let id = "PumpRadarVIP";
    let extractor = PatternExtractor::new(
        id,
        PriceScale::Decimal,
        vec![
            Step::coin_pair(r"([A-Z]{3,5})/BTC\b")?,
            Step::buy_price(r"(?i)Buy below\s*([\d.]+)")?,
            Step::first_targets(
                TargetRule::list(r"(?i)Sell:\s*([\d.]+(?:[ \t,]+[\d.]+)*)")?,
                3,
            ),
            Step::stop_loss(StopLossRule::Derived),
        ],
    );
    Ok(SourceDefinition::new(id, "Pump Radar VIP", Exchange::Bittrex, extractor))
}
