//! Calculator core.
//!
//! [`Calculator`] is the single inbound surface for the presentation layer:
//! it owns the [`Accumulator`], the chosen currency pair and the converted
//! amount, reads rates from an injected [`RateSnapshotHolder`], and
//! republishes its state through [`Observable`]s after every call.

use std::sync::Arc;

use calcfx_common::{Currency, Observable};
use calcfx_fx::{
    apply_ratio, conversion_ratio, Conversion, FetchStatus, FxResult, RateSnapshot,
    RateSnapshotHolder,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::accumulator::{Accumulator, Computation};
use crate::config::CalculatorConfig;
use crate::error::{CalcError, CalcResult};
use crate::operator::Operator;
use crate::selection::{ChosenCurrencies, CurrencyRow};
use crate::state::EntryState;
use crate::ui_state::UiState;

/// Calculator with currency conversion.
///
/// Driven from one thread; only the rate holder is shared with the
/// background fetch task.
pub struct Calculator {
    accumulator: Accumulator,
    rates: RateSnapshotHolder,
    config: CalculatorConfig,
    expression: Observable<String>,
    converted: Observable<String>,
    chosen: Observable<ChosenCurrencies>,
    last_conversion: Option<Conversion>,
}

impl Calculator {
    /// Create an idle calculator reading rates from `rates`.
    pub fn new(rates: RateSnapshotHolder, config: CalculatorConfig) -> Self {
        Self {
            accumulator: Accumulator::new(),
            rates,
            chosen: Observable::new(config.chosen_currencies()),
            config,
            expression: Observable::new(String::new()),
            converted: Observable::new(String::new()),
            last_conversion: None,
        }
    }

    /// Kick off the initial rate fetch when configured to.
    pub fn start(&self) -> Option<JoinHandle<FxResult<Arc<RateSnapshot>>>> {
        self.config.fetch_on_start.then(|| self.refresh_rates())
    }

    pub fn enter_digit(&mut self, digit: u8) -> CalcResult<()> {
        if let Err(e) = self.accumulator.enter_digit(digit) {
            warn!(digit, "Rejected digit key");
            return Err(e);
        }
        self.after_input();
        Ok(())
    }

    pub fn enter_operator(&mut self, operator: Operator) -> Computation {
        let outcome = self.accumulator.enter_operator(operator);
        self.after_input();
        outcome
    }

    pub fn enter_decimal_point(&mut self) {
        self.accumulator.enter_decimal_point();
        self.after_input();
    }

    pub fn compute_total(&mut self) -> Computation {
        let outcome = self.accumulator.compute_total();
        self.after_input();
        outcome
    }

    pub fn delete_last_char(&mut self) {
        self.accumulator.delete_last_char();
        self.after_input();
    }

    pub fn delete_all(&mut self) {
        self.accumulator.delete_all();
        self.after_input();
    }

    pub fn make_percent(&mut self) -> CalcResult<()> {
        let result = self.accumulator.make_percent();
        self.after_input();
        result
    }

    /// Pick the currency for a picker row.
    pub fn choose_currency(&mut self, row: CurrencyRow, currency: Currency) {
        debug!(row = ?row, currency = %currency, "Currency chosen");
        let mut chosen = self.chosen.get();
        chosen.set(row, currency);
        self.chosen.set_if_changed(chosen);
        self.clear_converted();
    }

    /// Pick a currency by row index (0 = source, 1 = target).
    pub fn choose_currency_at(&mut self, index: usize, currency: Currency) -> CalcResult<()> {
        let row = CurrencyRow::try_from(index)?;
        self.choose_currency(row, currency);
        Ok(())
    }

    /// Convert the current value from one currency to another.
    ///
    /// Returns `Ok(None)` when there is no first operand. A missing rate
    /// leaves both the expression and the converted amount untouched.
    pub fn convert(&mut self, from: &Currency, to: &Currency) -> CalcResult<Option<Conversion>> {
        if !self.accumulator.has_value() {
            return Ok(None);
        }

        let snapshot = self.rates.snapshot();
        let ctx = *self.accumulator.context();
        let ratio = conversion_ratio(&snapshot, from, to, &ctx).map_err(|e| {
            warn!(from = %from, to = %to, error = %e, "Conversion rate unavailable");
            CalcError::from(e)
        })?;

        let amount = match self.accumulator.conversion_operand() {
            Ok(Some(amount)) => amount,
            Ok(None) => return Ok(None),
            Err(e) => {
                self.publish_expression();
                return Err(e);
            }
        };
        self.publish_expression();

        let conversion = apply_ratio(amount, from, to, ratio, &ctx)?;
        info!(
            from = %from,
            to = %to,
            amount = %amount,
            ratio = %ratio,
            output = %conversion.output,
            "Conversion completed"
        );

        self.converted.set_if_changed(conversion.output_text());
        self.last_conversion = Some(conversion.clone());
        Ok(Some(conversion))
    }

    /// Convert between the currently chosen currencies.
    pub fn convert_chosen(&mut self) -> CalcResult<Option<Conversion>> {
        let chosen = self.chosen.get();
        self.convert(&chosen.source, &chosen.target)
    }

    /// Fire a rate refresh in the background.
    pub fn refresh_rates(&self) -> JoinHandle<FxResult<Arc<RateSnapshot>>> {
        self.rates.spawn_refresh()
    }

    /// Refresh rates and wait for the outcome.
    pub async fn fetch_rates(&self) -> FxResult<Arc<RateSnapshot>> {
        self.rates.refresh().await
    }

    pub fn state(&self) -> &EntryState {
        self.accumulator.state()
    }

    pub fn total(&self) -> rust_decimal::Decimal {
        self.accumulator.total()
    }

    /// Current expression display text.
    pub fn expression(&self) -> String {
        self.expression.get()
    }

    /// Current converted amount text, empty when invalidated.
    pub fn converted(&self) -> String {
        self.converted.get()
    }

    /// Last successful conversion, kept even after the text is cleared.
    pub fn last_conversion(&self) -> Option<&Conversion> {
        self.last_conversion.as_ref()
    }

    pub fn chosen_currencies(&self) -> ChosenCurrencies {
        self.chosen.get()
    }

    /// Currency codes available in the latest snapshot.
    pub fn currencies(&self) -> Vec<Currency> {
        self.rates.snapshot().currencies()
    }

    pub fn fetch_status(&self) -> FetchStatus {
        self.rates.status()
    }

    pub fn rates(&self) -> &RateSnapshotHolder {
        &self.rates
    }

    pub fn subscribe_expression(&self) -> watch::Receiver<String> {
        self.expression.subscribe()
    }

    pub fn subscribe_converted(&self) -> watch::Receiver<String> {
        self.converted.subscribe()
    }

    pub fn subscribe_chosen(&self) -> watch::Receiver<ChosenCurrencies> {
        self.chosen.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<FetchStatus> {
        self.rates.subscribe_status()
    }

    /// Fold the observables into one renderable state.
    pub fn ui_state(&self) -> UiState {
        let expression = self.expression();
        match self.fetch_status() {
            FetchStatus::Loading => UiState::Loading { expression },
            FetchStatus::Error => UiState::Error { expression },
            FetchStatus::Success => UiState::Ready {
                expression,
                converted: self.converted(),
                currencies: self.currencies(),
                chosen: self.chosen_currencies(),
            },
        }
    }

    fn after_input(&mut self) {
        self.publish_expression();
        self.clear_converted();
    }

    fn publish_expression(&self) {
        self.expression.set_if_changed(self.accumulator.display());
    }

    fn clear_converted(&self) {
        self.converted.set_if_changed(String::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcfx_fx::{FxError, MockRateProvider};
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    async fn setup() -> (Arc<MockRateProvider>, Calculator) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rate("EUR", dec!(1));
        provider.set_rate("USD", dec!(1.1));
        provider.set_rate("GBP", dec!(0.85));

        let holder = RateSnapshotHolder::new(provider.clone(), "key");
        let calculator = Calculator::new(holder, CalculatorConfig::default());
        calculator.fetch_rates().await.unwrap();
        (provider, calculator)
    }

    fn type_number(calculator: &mut Calculator, digits: &str) {
        for d in digits.bytes() {
            if d == b'.' {
                calculator.enter_decimal_point();
            } else {
                calculator.enter_digit(d - b'0').unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_convert_direct() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "10");

        let conversion = assert_ok!(calc.convert(&Currency::eur(), &Currency::usd())).unwrap();

        assert_eq!(conversion.output, dec!(11));
        assert_eq!(calc.converted(), "11");
        assert_eq!(calc.expression(), "10");
    }

    #[tokio::test]
    async fn test_convert_chosen_pair() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "20");
        calc.choose_currency(CurrencyRow::Target, Currency::gbp());

        calc.convert_chosen().unwrap();

        assert_eq!(calc.converted(), "17");
    }

    #[tokio::test]
    async fn test_convert_resolves_pending_expression() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "4");
        calc.enter_operator(Operator::Multiply);
        type_number(&mut calc, "5");

        calc.convert(&Currency::eur(), &Currency::usd()).unwrap();

        assert_eq!(calc.expression(), "20");
        assert_eq!(calc.converted(), "22");
        assert_eq!(calc.total(), dec!(20));
    }

    #[tokio::test]
    async fn test_convert_noop_when_empty() {
        let (_, mut calc) = setup().await;
        assert_eq!(calc.convert(&Currency::eur(), &Currency::usd()), Ok(None));
        assert_eq!(calc.converted(), "");
    }

    #[tokio::test]
    async fn test_missing_rate_keeps_converted_and_expression() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "10");
        calc.convert(&Currency::eur(), &Currency::usd()).unwrap();
        calc.enter_operator(Operator::Add);
        type_number(&mut calc, "5");
        calc.convert(&Currency::eur(), &Currency::usd()).unwrap();
        assert_eq!(calc.converted(), "16.5");

        let error = assert_err!(calc.convert(&Currency::eur(), &Currency::jpy()));

        assert_eq!(error, CalcError::Fx(FxError::MissingRate(Currency::jpy())));
        assert_eq!(error.error_code(), "MISSING_RATE");
        assert_eq!(calc.converted(), "16.5");
        assert_eq!(calc.expression(), "15");
    }

    #[tokio::test]
    async fn test_missing_rate_does_not_consume_pending_expression() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "2");
        calc.enter_operator(Operator::Add);
        type_number(&mut calc, "2");

        assert!(calc.convert(&Currency::new("CHF"), &Currency::usd()).is_err());
        assert_eq!(calc.expression(), "2+2");
    }

    #[tokio::test]
    async fn test_input_invalidates_converted() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "10");
        calc.convert_chosen().unwrap();
        assert_eq!(calc.converted(), "11");

        calc.enter_digit(0).unwrap();
        assert_eq!(calc.converted(), "");
        assert_eq!(calc.last_conversion().unwrap().output, dec!(11));
    }

    #[tokio::test]
    async fn test_choosing_currency_invalidates_converted() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "10");
        calc.convert_chosen().unwrap();

        calc.choose_currency_at(0, Currency::gbp()).unwrap();

        assert_eq!(calc.converted(), "");
        assert_eq!(calc.chosen_currencies().source, Currency::gbp());
        assert_eq!(
            calc.choose_currency_at(5, Currency::usd()),
            Err(CalcError::InvalidRow(5))
        );
    }

    #[tokio::test]
    async fn test_convert_on_malformed_error_marker_fails_again() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "3");
        calc.enter_operator(Operator::Subtract);
        type_number(&mut calc, "5");
        calc.compute_total();
        calc.delete_last_char();
        calc.enter_operator(Operator::Add);
        type_number(&mut calc, "1");
        assert!(matches!(calc.compute_total(), Computation::Failed(_)));
        assert_eq!(calc.expression(), "Error");

        let error = assert_err!(calc.convert(&Currency::eur(), &Currency::usd()));

        assert_eq!(error, CalcError::Parse("-".to_string()));
        assert_eq!(calc.expression(), "Error");
        assert_eq!(calc.converted(), "");
    }

    #[tokio::test]
    async fn test_convert_after_overflow_uses_retained_operand() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "1000000000000000000000000000");
        calc.enter_operator(Operator::Multiply);
        type_number(&mut calc, "1000");
        assert_eq!(
            calc.compute_total(),
            Computation::Failed(CalcError::Overflow)
        );

        let conversion = assert_ok!(calc.convert(&Currency::eur(), &Currency::gbp())).unwrap();

        assert_eq!(conversion.output, dec!(850000000000000000000000000));
        assert_eq!(calc.expression(), "Error");
        assert_eq!(calc.converted(), "850000000000000000000000000");
    }

    #[tokio::test]
    async fn test_convert_pending_division_by_zero() {
        let (_, mut calc) = setup().await;
        type_number(&mut calc, "8");
        calc.enter_operator(Operator::Divide);
        type_number(&mut calc, "0");

        assert_eq!(
            calc.convert(&Currency::eur(), &Currency::usd()),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(calc.expression(), "8/0");
        assert_eq!(calc.converted(), "");
    }

    #[tokio::test]
    async fn test_ui_state_follows_fetch_status() {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rate("EUR", dec!(1));
        let holder = RateSnapshotHolder::new(provider.clone(), "key");
        let mut calc = Calculator::new(holder, CalculatorConfig::default());
        calc.enter_digit(7).unwrap();

        assert_eq!(
            calc.ui_state(),
            UiState::Loading {
                expression: "7".to_string()
            }
        );

        provider.fail_next(FxError::Network("offline".to_string()));
        assert_err!(calc.fetch_rates().await);
        assert_eq!(calc.ui_state().status(), FetchStatus::Error);
        assert_eq!(calc.ui_state().expression(), "7");

        calc.fetch_rates().await.unwrap();
        match calc.ui_state() {
            UiState::Ready {
                currencies, chosen, ..
            } => {
                assert_eq!(currencies, vec![Currency::eur()]);
                assert_eq!(chosen, ChosenCurrencies::default());
            }
            other => panic!("expected ready state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expression_subscribers_notified() {
        let (_, mut calc) = setup().await;
        let mut rx = calc.subscribe_expression();

        calc.enter_digit(5).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "5");
    }

    #[tokio::test]
    async fn test_start_respects_config() {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rate("EUR", dec!(1));
        let holder = RateSnapshotHolder::new(provider.clone(), "key");

        let config = CalculatorConfig {
            fetch_on_start: false,
            ..Default::default()
        };
        let calc = Calculator::new(holder.clone(), config);
        assert!(calc.start().is_none());

        let calc = Calculator::new(holder, CalculatorConfig::default());
        calc.start().unwrap().await.unwrap().unwrap();
        assert_eq!(calc.fetch_status(), FetchStatus::Success);
        assert_eq!(provider.calls(), 1);
    }
}
