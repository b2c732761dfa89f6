//! Operator-facing reports
//!
//! A structured report is printed for every signal that was extracted and
//! priced; it also hands the signal to the coin monitor. Everything else that
//! passed the relevance gate gets a plain report with the raw message.

use crate::forward::{ForwardRequest, Forwarder};
use crate::types::{format_pct, format_price, CoinPair, Exchange, Signal};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

const HEAVY_RULE: &str =
    "==============================================================================================";
const LIGHT_RULE: &str =
    "----------------------------------------------------------------------------------------------";

#[derive(Debug, Clone, PartialEq)]
pub struct StructuredReport {
    pub source_name: String,
    pub exchange: Exchange,
    pub signal: Signal,
    /// Last traded price on the exchange
    pub exchange_price: Decimal,
}

impl StructuredReport {
    pub fn new(
        source_name: impl Into<String>,
        exchange: Exchange,
        signal: Signal,
        exchange_price: Decimal,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            exchange,
            signal,
            exchange_price,
        }
    }

    pub fn coin_pair(&self) -> &CoinPair {
        &self.signal.coin_pair
    }

    /// How far the market sits below the call, as a percent of the buy price.
    /// `None` when the ratio does not fit in a `Decimal`.
    pub fn price_diff_pct(&self) -> Option<Decimal> {
        let buy = self.signal.buy_price;
        buy.checked_sub(self.exchange_price)?
            .checked_div(buy)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn market_url(&self) -> String {
        self.exchange.market_url(&self.signal.coin_pair)
    }
}

impl fmt::Display for StructuredReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for _ in 0..3 {
            writeln!(f, "{}", HEAVY_RULE)?;
        }
        writeln!(f, "Channel: {}", self.source_name)?;
        writeln!(f, "{}", HEAVY_RULE)?;
        writeln!(f, "Coin Pair: {}", self.signal.coin_pair)?;
        writeln!(f, "BUY: {}", format_price(self.signal.buy_price))?;
        writeln!(f, "TARGETS:")?;
        for (i, target) in self.signal.targets.iter().enumerate() {
            writeln!(f, "    {}: {}", i + 1, format_price(*target))?;
        }
        writeln!(f, "STOP LOSS: {}", format_price(self.signal.stop_loss))?;
        writeln!(f, "PRICE: {}", format_price(self.exchange_price))?;
        match self.price_diff_pct() {
            Some(pct) => writeln!(f, "PRICE DIFF: {}%", format_pct(pct))?,
            None => writeln!(f, "PRICE DIFF: n/a")?,
        }
        writeln!(f, "EXCHANGE: {}", self.market_url())?;
        for _ in 0..3 {
            writeln!(f, "{}", LIGHT_RULE)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlainReport {
    pub channel_title: String,
    pub channel_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Original message body, untrimmed
    pub text: String,
}

impl fmt::Display for PlainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", HEAVY_RULE)?;
        match &self.channel_id {
            Some(id) => writeln!(f, "Channel: {} ({})", self.channel_title, id)?,
            None => writeln!(f, "Channel: {}", self.channel_title)?,
        }
        writeln!(f, "Time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "{}", HEAVY_RULE)?;
        writeln!(f, "{}", self.text.trim())?;
        writeln!(f, "{}", LIGHT_RULE)?;
        writeln!(f)
    }
}

/// Writes reports to an output and forwards structured signals
pub struct Reporter {
    out: Mutex<Box<dyn Write + Send>>,
    forwarder: Arc<dyn Forwarder>,
}

impl Reporter {
    /// Report to stdout
    pub fn new(forwarder: Arc<dyn Forwarder>) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), forwarder)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, forwarder: Arc<dyn Forwarder>) -> Self {
        Self {
            out: Mutex::new(out),
            forwarder,
        }
    }

    pub fn structured(&self, report: &StructuredReport) {
        self.write(report);

        let request = ForwardRequest::new(&report.signal, report.exchange);
        if let Err(e) = self.forwarder.forward(&request) {
            tracing::warn!("Coin monitor forward failed for {}: {}", request.coin, e);
        }
    }

    pub fn plain(&self, report: &PlainReport) {
        self.write(report);
    }

    fn write(&self, report: &dyn fmt::Display) {
        let mut out = self.out.lock();
        if let Err(e) = write!(out, "{}", report).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write report: {}", e);
        }
    }
}

/// In-memory writer shared with the test that inspects it
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use crate::forward::MockForwarder;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn report() -> StructuredReport {
        StructuredReport::new(
            "VipCryptoZ (Bittrex)",
            Exchange::Bittrex,
            Signal {
                coin_pair: CoinPair::btc("SLR").unwrap(),
                buy_price: dec!(0.0000559),
                targets: vec![dec!(0.000061), dec!(0.000067)],
                stop_loss: dec!(0.00005031),
            },
            dec!(0.000054),
        )
    }

    #[test]
    fn test_price_diff_pct() {
        // (0.0000559 - 0.000054) / 0.0000559 * 100 = 3.4004...
        assert_eq!(report().price_diff_pct().map(|p| p.round_dp(2)), Some(dec!(3.40)));
    }

    #[test]
    fn test_structured_layout_order() {
        let text = report().to_string();
        let order = [
            "Channel: VipCryptoZ (Bittrex)",
            "Coin Pair: SLR-BTC",
            "BUY: 0.00005590",
            "    1: 0.00006100",
            "    2: 0.00006700",
            "STOP LOSS: 0.00005031",
            "PRICE: 0.00005400",
            "PRICE DIFF: 3.40%",
            "EXCHANGE: https://bittrex.com/Market/Index?MarketName=BTC-SLR",
        ];
        let mut last = 0;
        for line in order {
            let pos = text[last..].find(line).unwrap_or_else(|| panic!("missing {:?}", line));
            last += pos + line.len();
        }
    }

    #[test]
    fn test_plain_report_trims_body() {
        let report = PlainReport {
            channel_title: "Some Channel".to_string(),
            channel_id: Some("somechannel".to_string()),
            timestamp: Utc.with_ymd_and_hms(2018, 1, 14, 9, 30, 0).unwrap(),
            text: "  hello BTC holders \n".to_string(),
        };
        let text = report.to_string();
        assert!(text.contains("Channel: Some Channel (somechannel)"));
        assert!(text.contains("Time: 2018-01-14 09:30:00"));
        assert!(text.contains("\nhello BTC holders\n"));
    }

    #[test]
    fn test_plain_report_without_channel_id() {
        let report = PlainReport {
            channel_title: "Private".to_string(),
            channel_id: None,
            timestamp: Utc::now(),
            text: "VIB".to_string(),
        };
        assert!(report.to_string().contains("Channel: Private\n"));
    }

    #[test]
    fn test_structured_forwards_signal() {
        let mut forwarder = MockForwarder::new();
        forwarder
            .expect_forward()
            .withf(|req| req.coin == "SLR" && req.targets == "0.00006100,0.00006700")
            .times(1)
            .returning(|_| Ok(()));

        let buffer = SharedBuffer::default();
        let reporter = Reporter::with_writer(Box::new(buffer.clone()), Arc::new(forwarder));
        reporter.structured(&report());

        assert!(buffer.contents().contains("Coin Pair: SLR-BTC"));
    }

    #[test]
    fn test_forward_failure_is_swallowed() {
        let mut forwarder = MockForwarder::new();
        forwarder
            .expect_forward()
            .returning(|_| Err(RelayError::Forward("spawn failed".to_string())));

        let buffer = SharedBuffer::default();
        let reporter = Reporter::with_writer(Box::new(buffer.clone()), Arc::new(forwarder));
        reporter.structured(&report());

        assert!(buffer.contents().contains("STOP LOSS"));
    }
}
