//! Step-based extractor: one ordered list of pattern steps per message format

use super::SignalExtractor;
use crate::error::{ExtractionError, Result, SignalField};
use crate::types::{CoinPair, Signal};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

/// Applied to the buy price when a format carries no stop-loss
pub const DERIVED_STOP_LOSS_RATIO: Decimal = dec!(0.90);

/// Decimal places kept on derived prices
pub const PRICE_DP: u32 = 8;

/// How a format writes its price literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceScale {
    /// Already decimal, e.g. `0.00001663`
    Decimal,
    /// Integer satoshis, e.g. `5590` for `0.0000559`
    Satoshi,
}

impl PriceScale {
    /// Parse a captured literal. Zero, negative and unparsable values are rejected.
    pub fn parse(&self, literal: &str) -> Option<Decimal> {
        let literal = literal.trim().trim_end_matches('.');
        let value = Decimal::from_str(literal).ok()?;
        let value = match self {
            PriceScale::Satoshi if !literal.contains('.') => value.checked_mul(Decimal::new(1, 8))?,
            _ => value,
        };
        (value > Decimal::ZERO).then_some(value)
    }
}

#[derive(Debug, Clone)]
pub enum TargetRule {
    /// Every participating capture group is one target
    Groups(Regex),
    /// First pattern required, the rest contribute when present
    Numbered { first: Regex, rest: Vec<Regex> },
    /// Group 1 holds a list like `0.1 / 0.2, 0.3`
    List(Regex),
}

impl TargetRule {
    pub fn groups(pattern: &str) -> Result<Self> {
        Ok(TargetRule::Groups(Regex::new(pattern)?))
    }

    pub fn numbered(first: &str, rest: &[&str]) -> Result<Self> {
        Ok(TargetRule::Numbered {
            first: Regex::new(first)?,
            rest: rest
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<_, _>>()?,
        })
    }

    pub fn list(pattern: &str) -> Result<Self> {
        Ok(TargetRule::List(Regex::new(pattern)?))
    }

    /// Pattern that decides whether the step matched at all
    fn pattern(&self) -> &Regex {
        match self {
            TargetRule::Groups(re) | TargetRule::List(re) => re,
            TargetRule::Numbered { first, .. } => first,
        }
    }

    /// Raw literals in message order; `None` when the required part is missing
    fn literals<'t>(&self, text: &'t str) -> Option<Vec<&'t str>> {
        match self {
            TargetRule::Groups(re) => {
                let caps = re.captures(text)?;
                Some(caps.iter().skip(1).flatten().map(|m| m.as_str()).collect())
            }
            TargetRule::Numbered { first, rest } => {
                let mut found = vec![capture(first, text)?];
                found.extend(rest.iter().filter_map(|re| capture(re, text)));
                Some(found)
            }
            TargetRule::List(re) => {
                let list = capture(re, text)?;
                Some(
                    list.split(|c: char| !(c.is_ascii_digit() || c == '.'))
                        .filter(|s| !s.is_empty() && *s != ".")
                        .collect(),
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum StopLossRule {
    /// Must be present in the message
    Explicit(Regex),
    /// Used when present, otherwise derived from the buy price
    OrDerived(Regex),
    /// Always derived from the buy price
    Derived,
}

impl StopLossRule {
    pub fn explicit(pattern: &str) -> Result<Self> {
        Ok(StopLossRule::Explicit(Regex::new(pattern)?))
    }

    pub fn or_derived(pattern: &str) -> Result<Self> {
        Ok(StopLossRule::OrDerived(Regex::new(pattern)?))
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Group 1 is the alt symbol; aliases are matched case-insensitively
    CoinPair {
        pattern: Regex,
        aliases: Vec<(String, String)>,
    },
    BuyPrice(Regex),
    Targets {
        rule: TargetRule,
        /// Keep only the first N targets
        max: Option<usize>,
    },
    StopLoss(StopLossRule),
}

impl Step {
    pub fn coin_pair(pattern: &str) -> Result<Self> {
        Ok(Step::CoinPair {
            pattern: Regex::new(pattern)?,
            aliases: Vec::new(),
        })
    }

    pub fn coin_pair_with_aliases(pattern: &str, aliases: &[(&str, &str)]) -> Result<Self> {
        Ok(Step::CoinPair {
            pattern: Regex::new(pattern)?,
            aliases: aliases
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        })
    }

    pub fn buy_price(pattern: &str) -> Result<Self> {
        Ok(Step::BuyPrice(Regex::new(pattern)?))
    }

    pub fn targets(rule: TargetRule) -> Self {
        Step::Targets { rule, max: None }
    }

    pub fn first_targets(rule: TargetRule, max: usize) -> Self {
        Step::Targets {
            rule,
            max: Some(max),
        }
    }

    pub fn stop_loss(rule: StopLossRule) -> Self {
        Step::StopLoss(rule)
    }
}

#[derive(Debug, Default)]
struct Draft {
    coin_pair: Option<CoinPair>,
    buy_price: Option<Decimal>,
    targets: Vec<Decimal>,
    stop_loss: Option<Decimal>,
}

/// Extractor for one source's free-text format
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    source_id: String,
    scale: PriceScale,
    steps: Vec<Step>,
}

impl PatternExtractor {
    pub fn new(source_id: impl Into<String>, scale: PriceScale, steps: Vec<Step>) -> Self {
        Self {
            source_id: source_id.into(),
            scale,
            steps,
        }
    }

    fn fail(&self, field: SignalField) -> ExtractionError {
        ExtractionError::new(field, &self.source_id)
    }

    fn fail_at(&self, field: SignalField, pattern: &Regex) -> ExtractionError {
        self.fail(field).with_pattern(pattern)
    }

    fn price(
        &self,
        literal: &str,
        field: SignalField,
        pattern: &Regex,
    ) -> std::result::Result<Decimal, ExtractionError> {
        self.scale
            .parse(literal)
            .ok_or_else(|| self.fail_at(field, pattern))
    }

    fn derived_stop_loss(
        &self,
        buy_price: Option<Decimal>,
    ) -> std::result::Result<Decimal, ExtractionError> {
        buy_price
            .and_then(derive_stop_loss)
            .ok_or_else(|| self.fail(SignalField::StopLoss))
    }

    fn apply(
        &self,
        step: &Step,
        text: &str,
        draft: &mut Draft,
    ) -> std::result::Result<(), ExtractionError> {
        match step {
            Step::CoinPair { pattern, aliases } => {
                let raw = capture(pattern, text)
                    .ok_or_else(|| self.fail_at(SignalField::CoinPair, pattern))?;
                let alt = aliases
                    .iter()
                    .find(|(from, _)| from.eq_ignore_ascii_case(raw))
                    .map(|(_, to)| to.as_str())
                    .unwrap_or(raw);
                let pair = CoinPair::btc(alt)
                    .ok_or_else(|| self.fail_at(SignalField::CoinPair, pattern))?;
                draft.coin_pair = Some(pair);
            }
            Step::BuyPrice(pattern) => {
                let literal = capture(pattern, text)
                    .ok_or_else(|| self.fail_at(SignalField::BuyPrice, pattern))?;
                draft.buy_price = Some(self.price(literal, SignalField::BuyPrice, pattern)?);
            }
            Step::Targets { rule, max } => {
                let literals = rule
                    .literals(text)
                    .ok_or_else(|| self.fail_at(SignalField::Targets, rule.pattern()))?;
                let mut targets = literals
                    .into_iter()
                    .map(|l| self.price(l, SignalField::Targets, rule.pattern()))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                if let Some(max) = max {
                    targets.truncate(*max);
                }
                draft.targets = targets;
            }
            Step::StopLoss(rule) => {
                let explicit = match rule {
                    StopLossRule::Explicit(re) => Some((
                        capture(re, text).ok_or_else(|| self.fail_at(SignalField::StopLoss, re))?,
                        re,
                    )),
                    StopLossRule::OrDerived(re) => capture(re, text).map(|literal| (literal, re)),
                    StopLossRule::Derived => None,
                };
                let stop_loss = match explicit {
                    Some((literal, re)) => self.price(literal, SignalField::StopLoss, re)?,
                    None => self.derived_stop_loss(draft.buy_price)?,
                };
                draft.stop_loss = Some(stop_loss);
            }
        }
        Ok(())
    }
}

impl SignalExtractor for PatternExtractor {
    fn extract(&self, text: &str) -> std::result::Result<Signal, ExtractionError> {
        let mut draft = Draft::default();
        for step in &self.steps {
            self.apply(step, text, &mut draft)?;
        }

        let coin_pair = draft.coin_pair.ok_or_else(|| self.fail(SignalField::CoinPair))?;
        let buy_price = draft.buy_price.ok_or_else(|| self.fail(SignalField::BuyPrice))?;
        if draft.targets.is_empty() {
            return Err(self.fail(SignalField::Targets));
        }
        let stop_loss = match draft.stop_loss {
            Some(stop_loss) => stop_loss,
            None => self.derived_stop_loss(Some(buy_price))?,
        };

        Ok(Signal {
            coin_pair,
            buy_price,
            targets: draft.targets,
            stop_loss,
        })
    }
}

/// `buy * 0.90`, rounded to 8 places; `None` when that rounds down to zero
pub fn derive_stop_loss(buy_price: Decimal) -> Option<Decimal> {
    let stop_loss = buy_price
        .checked_mul(DERIVED_STOP_LOSS_RATIO)?
        .round_dp(PRICE_DP);
    (stop_loss > Decimal::ZERO).then_some(stop_loss)
}

fn capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
