use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock as SyncRwLock;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use vantage_execution::venue::{Kline, OrderBook, OrderOptions, Ticker, VenueAdapter, VenueCredentials};
use vantage_execution::{
    synthesize_trade, AssetBalance, Balance, ClientOrderId, Order, OrderId, OrderManager,
    OrderProvenance, OrderSyncEvent, OrderSyncService, OrderUpdate, PrecisionGate, Position, Trade,
};
use vantage_instrument::{OrderStatus, OrderType, Side, Symbol, TimeInForce, VenueId};
use vantage_integration::{Debouncer, FnvIndexMap, FnvIndexSet, NoneOneOrMany};
use vantage_risk::{RiskAccountState, RiskGate, RiskLimits, RiskSeverity};
use vantage_strategy::{
    AnalyzeInput, CancelIntent, Decision, OrderIntent, Strategy, StrategyContext, StrategyDescriptor,
    UpdateIntent,
};

use crate::bus::EventBus;
use crate::error::EngineError;
use crate::events::{
    BalanceUpdate, EmergencyStop, EngineEvent, EngineStarted, EngineStopped, ExchangeConnected,
    PositionUpdate, RiskLimitEvent, StrategySignal, TickerUpdate, TradeUpdate,
};
use crate::loader::StrategyLoader;
use crate::state::EngineState;
use crate::subscription::{DataType, SubscriptionCoordinator};
use crate::symbol_cache::SymbolInfoCache;

const PERFORMANCE_DEBOUNCE: std::time::Duration = std::time::Duration::from_secs(2);
const ORDER_SYNC_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);
const ORDER_SYNC_BATCH_SIZE: usize = 20;

/// Decodes the strategy id embedded in a generated `clientOrderId`, matching
/// whichever of the three recognised shapes the id was built from.
fn decode_strategy_id(client_order_id: &str) -> Option<String> {
    if let Some(rest) = client_order_id.strip_prefix("strategy_") {
        if let Some(end) = rest.find('_') {
            return Some(rest[..end].to_string());
        }
    }

    if let Some(rest) = client_order_id
        .strip_prefix('E')
        .or_else(|| client_order_id.strip_prefix('T'))
    {
        if let Some(end) = rest.find('D') {
            return Some(rest[..end].to_string());
        }
    }

    if let Some(rest) = client_order_id.strip_prefix('s') {
        let trailing_digits: String = rest.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
        if trailing_digits.len() >= 10 {
            let id_len = rest.len() - trailing_digits.len();
            if id_len > 0 {
                return Some(rest[..id_len].to_string());
            }
        }
    }

    None
}

enum AccountMessage {
    Order { venue: VenueId, update: OrderUpdate },
    Balance { venue: VenueId, balances: Vec<AssetBalance>, account: Vec<Balance> },
    Position { venue: VenueId, positions: Vec<Position> },
}

struct StrategyEntry {
    descriptor: StrategyDescriptor,
    strategy: Arc<AsyncMutex<Box<dyn Strategy>>>,
}

/// Ties together event dispatch, subscription management, the symbol-info
/// cache and the order pipeline into the single object applications drive.
pub struct TradingEngine {
    state: SyncRwLock<EngineState>,
    pub bus: Arc<EventBus>,
    venues: Arc<SyncRwLock<FnvIndexMap<VenueId, Arc<dyn VenueAdapter>>>>,
    strategies: SyncRwLock<FnvIndexMap<String, StrategyEntry>>,
    orders: Arc<SyncRwLock<OrderManager>>,
    symbol_cache: SymbolInfoCache,
    pub subscriptions: SubscriptionCoordinator,
    precision: PrecisionGate,
    risk: RiskGate,
    risk_limits: SyncRwLock<RiskLimits>,
    risk_account: SyncRwLock<RiskAccountState>,
    created_gate: SyncRwLock<FnvIndexSet<String>>,
    pending_account_messages: SyncRwLock<VecDeque<AccountMessage>>,
    performance_debounce: Debouncer<String>,
    sync_handle: SyncRwLock<Option<tokio::task::JoinHandle<()>>>,
}

impl TradingEngine {
    pub fn new() -> Self {
        let bus = Arc::new(EventBus::new());
        let venues = Arc::new(SyncRwLock::new(FnvIndexMap::default()));
        Self {
            state: SyncRwLock::new(EngineState::Stopped),
            subscriptions: SubscriptionCoordinator::new(bus.clone(), venues.clone()),
            bus,
            venues,
            strategies: SyncRwLock::new(FnvIndexMap::default()),
            orders: Arc::new(SyncRwLock::new(OrderManager::new())),
            symbol_cache: SymbolInfoCache::new(),
            precision: PrecisionGate::default(),
            risk: RiskGate,
            risk_limits: SyncRwLock::new(RiskLimits::default()),
            risk_account: SyncRwLock::new(RiskAccountState::new(
                0,
                rust_decimal::Decimal::ZERO,
                rust_decimal::Decimal::ZERO,
                rust_decimal::Decimal::ZERO,
                rust_decimal::Decimal::ZERO,
            )),
            created_gate: SyncRwLock::new(FnvIndexSet::default()),
            pending_account_messages: SyncRwLock::new(VecDeque::new()),
            performance_debounce: Debouncer::new(PERFORMANCE_DEBOUNCE),
            sync_handle: SyncRwLock::new(None),
        }
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn set_risk_limits(&self, limits: RiskLimits) {
        *self.risk_limits.write() = limits;
    }

    pub fn update_risk_account(&self, account: RiskAccountState) {
        *self.risk_account.write() = account;
    }

    pub fn orders(&self) -> Arc<SyncRwLock<OrderManager>> {
        self.orders.clone()
    }

    // ---- Attachment -----------------------------------------------------

    /// Registers a venue adapter and, if it is already connected, tries to
    /// subscribe to its user-data stream (a failure here is only a warning).
    pub async fn attach_venue(&self, adapter: Arc<dyn VenueAdapter>) -> Result<(), EngineError> {
        let name = adapter.name().clone();
        {
            let mut venues = self.venues.write();
            if venues.contains_key(&name) {
                return Err(EngineError::DuplicateName { kind: "venue", name: name.to_string() });
            }
            venues.insert(name.clone(), adapter.clone());
        }

        if adapter.is_connected() {
            self.bus.publish(EngineEvent::ExchangeConnected(ExchangeConnected { venue: name.clone() }));
            if let Err(err) = adapter.subscribe_to_user_data().await {
                warn!(venue = %name, error = %err, "user-data subscription failed");
            }
        }
        Ok(())
    }

    /// Attaches a strategy. If the engine is already running, its initial
    /// data is loaded and its subscriptions opened immediately; otherwise
    /// both are deferred to `start`.
    pub async fn attach_strategy(&self, strategy: Box<dyn Strategy>) -> Result<(), EngineError> {
        let descriptor = strategy.descriptor().clone();
        let name = descriptor.strategy_name.clone();

        {
            let strategies = self.strategies.read();
            if strategies.contains_key(&name) {
                return Err(EngineError::DuplicateName { kind: "strategy", name });
            }
        }

        let entry = StrategyEntry { descriptor: descriptor.clone(), strategy: Arc::new(AsyncMutex::new(strategy)) };
        self.strategies.write().insert(name.clone(), entry);

        if self.state() == EngineState::Running {
            self.prime_strategy(&descriptor).await;
        }
        Ok(())
    }

    async fn prime_strategy(&self, descriptor: &StrategyDescriptor) {
        let context = &descriptor.context;
        let Some(venue_id) = context.venues.clone().into_vec().into_iter().next() else {
            return;
        };
        let Some(adapter) = self.venues.read().get(&venue_id).cloned() else {
            warn!(venue = %venue_id, strategy = %descriptor.strategy_name, "venue not attached, skipping prefetch");
            return;
        };

        let _ = self.symbol_cache.get(&adapter, &venue_id, &context.symbol, Utc::now()).await;

        let bundle = StrategyLoader::load(&adapter, &venue_id, Some(&context.symbol), context.initial_data_config.as_ref()).await;
        let strategy = self.strategies.read().get(&descriptor.strategy_name).map(|e| e.strategy.clone());
        if let Some(strategy) = strategy {
            strategy.lock().await.process_initial_data(bundle).await;
        }

        self.open_subscriptions(&descriptor.strategy_name, &venue_id, context).await;
    }

    async fn open_subscriptions(&self, strategy_name: &str, venue_id: &VenueId, context: &StrategyContext) {
        let spec = &context.subscription;
        let families = [
            (spec.ticker.as_ref(), DataType::Ticker),
            (spec.orderbook.as_ref(), DataType::OrderBook),
            (spec.trades.as_ref(), DataType::Trades),
            (spec.klines.as_ref(), DataType::Klines),
        ];
        for (config, data_type) in families {
            let Some(config) = config else { continue };
            if !config.enabled {
                continue;
            }
            if let Err(err) = self
                .subscriptions
                .subscribe(strategy_name, venue_id, &context.symbol, data_type, config.params.clone(), context.method)
                .await
            {
                warn!(strategy = strategy_name, error = %err, "subscription failed");
            }
        }
    }

    // ---- Lifecycle --------------------------------------------------------

    /// `stopped -> initializing -> running`. Re-entering from any other
    /// state logs a warning and returns without doing anything.
    pub async fn start(&self) {
        {
            let mut state = self.state.write();
            if *state != EngineState::Stopped {
                warn!(state = %*state, "start() called while not stopped, ignoring");
                return;
            }
            *state = EngineState::Initializing;
        }

        let venues: Vec<Arc<dyn VenueAdapter>> = self.venues.read().values().cloned().collect();
        for adapter in venues {
            if let Err(err) = adapter.connect(VenueCredentials::default()).await {
                warn!(venue = %adapter.name(), error = %err, "venue connect failed, continuing best-effort");
            } else {
                self.bus.publish(EngineEvent::ExchangeConnected(ExchangeConnected { venue: adapter.name().clone() }));
            }
        }

        *self.state.write() = EngineState::Running;

        let descriptors: Vec<StrategyDescriptor> =
            self.strategies.read().values().map(|entry| entry.descriptor.clone()).collect();
        for descriptor in descriptors {
            self.prime_strategy(&descriptor).await;
        }

        self.flush_pending_account_messages().await;
        self.spawn_order_sync();

        self.bus.publish(EngineEvent::EngineStarted(EngineStarted));
        info!("engine started");
    }

    /// Runs the order-sync service (C5) in the background, polling every
    /// attached venue's authoritative order state and publishing the
    /// status transitions that drift out of sync with the push path.
    fn spawn_order_sync(&self) {
        let venues = self.venues.read().clone();
        let service = OrderSyncService::new(self.orders.clone(), venues, ORDER_SYNC_BATCH_SIZE);
        let bus = self.bus.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(ORDER_SYNC_INTERVAL);
            loop {
                interval.tick().await;
                for event in service.tick(Utc::now()).await {
                    let engine_event = match event {
                        OrderSyncEvent::Filled(order) => EngineEvent::OrderFilled(order),
                        OrderSyncEvent::PartiallyFilled(order) => EngineEvent::OrderPartiallyFilled(order),
                        OrderSyncEvent::Cancelled(order) => EngineEvent::OrderCancelled(order),
                        OrderSyncEvent::Rejected(order) => EngineEvent::OrderRejected(order),
                        OrderSyncEvent::Expired(_) => continue,
                    };
                    bus.publish(engine_event);
                }
            }
        });
        *self.sync_handle.write() = Some(handle);
    }

    /// `running -> stopping -> stopped`. Force-flushes debounced performance
    /// writes, cancels the background order-sync task, runs every
    /// strategy's `cleanup`, and clears all subscriptions before emitting
    /// `EngineStopped`.
    pub async fn stop(&self) {
        {
            let mut state = self.state.write();
            if *state != EngineState::Running {
                warn!(state = %*state, "stop() called while not running, ignoring");
                return;
            }
            *state = EngineState::Stopping;
        }

        self.performance_debounce.flush_all();
        if let Some(handle) = self.sync_handle.write().take() {
            handle.abort();
        }

        let strategies: Vec<Arc<AsyncMutex<Box<dyn Strategy>>>> =
            self.strategies.read().values().map(|entry| entry.strategy.clone()).collect();
        for strategy in strategies {
            strategy.lock().await.cleanup().await;
        }

        self.subscriptions.clear();
        *self.state.write() = EngineState::Stopped;
        self.bus.publish(EngineEvent::EngineStopped(EngineStopped));
        info!("engine stopped");
    }

    /// Raised by an external emergency-stop signal; stops the engine
    /// asynchronously rather than inline, since callers outside an `&self`
    /// async context can't await `stop()` directly.
    pub fn emergency_stop(self: &Arc<Self>, reason: impl Into<String>) {
        let reason = reason.into();
        let engine = self.clone();
        tokio::spawn(async move {
            engine.trigger_emergency_stop(reason).await;
        });
    }

    /// Raised by a `RiskSeverity::Critical` event (a hard breach or
    /// near-limit warning on a budget-style limit): publishes
    /// `EmergencyStop` and stops the engine inline.
    async fn trigger_emergency_stop(&self, reason: String) {
        self.bus.publish(EngineEvent::EmergencyStop(EmergencyStop { reason: reason.clone(), at: Utc::now() }));
        warn!(reason, "emergency stop triggered");
        self.stop().await;
    }

    // ---- Market-data event routing ----------------------------------------

    pub async fn on_ticker(&self, venue: VenueId, symbol: Symbol, ticker: Ticker) {
        self.bus.publish(EngineEvent::TickerUpdate(TickerUpdate { venue: venue.clone(), symbol: symbol.clone(), ticker: ticker.clone() }));
        self.dispatch(AnalyzeInput::Ticker { venue, symbol, ticker }).await;
    }

    pub async fn on_order_book(&self, venue: VenueId, symbol: Symbol, book: OrderBook) {
        self.bus.publish(EngineEvent::OrderBookUpdate(crate::events::OrderBookUpdate {
            venue: venue.clone(),
            symbol: symbol.clone(),
            book: book.clone(),
        }));
        self.dispatch(AnalyzeInput::OrderBook { venue, symbol, book }).await;
    }

    pub async fn on_trades(&self, venue: VenueId, symbol: Symbol, trades: Vec<Trade>) {
        self.bus.publish(EngineEvent::TradeUpdate(TradeUpdate { venue: venue.clone(), symbol: symbol.clone(), trades: trades.clone() }));
        self.dispatch(AnalyzeInput::Trades { venue, symbol, trades }).await;
    }

    pub async fn on_klines(&self, venue: VenueId, symbol: Symbol, interval: String, klines: Vec<Kline>) {
        self.bus.publish(EngineEvent::KlineUpdate(crate::events::KlineUpdate {
            venue: venue.clone(),
            symbol: symbol.clone(),
            interval: interval.clone(),
            klines: klines.clone(),
        }));
        self.dispatch(AnalyzeInput::Klines { venue, symbol, interval, klines }).await;
    }

    async fn dispatch(&self, input: AnalyzeInput) {
        let entries: Vec<(String, Arc<AsyncMutex<Box<dyn Strategy>>>)> =
            self.strategies.read().iter().map(|(name, entry)| (name.clone(), entry.strategy.clone())).collect();

        for (name, strategy) in entries {
            let outcome = strategy.lock().await.analyze(input.clone()).await;
            match outcome {
                Ok(decisions) => self.handle_decisions(&name, decisions).await,
                Err(err) => self.bus.publish(EngineEvent::StrategyError(err)),
            }
        }
    }

    async fn handle_decisions(&self, strategy_name: &str, decisions: NoneOneOrMany<Decision>) {
        for decision in decisions.into_vec() {
            match decision.clone() {
                Decision::Hold => {}
                Decision::Buy(intent) => {
                    self.bus.publish(EngineEvent::StrategySignal(StrategySignal {
                        strategy_id: self.strategy_id(strategy_name),
                        strategy_name: strategy_name.to_string(),
                        decision,
                    }));
                    self.route_order(strategy_name, Side::Buy, intent).await;
                }
                Decision::Sell(intent) => {
                    self.bus.publish(EngineEvent::StrategySignal(StrategySignal {
                        strategy_id: self.strategy_id(strategy_name),
                        strategy_name: strategy_name.to_string(),
                        decision,
                    }));
                    self.route_order(strategy_name, Side::Sell, intent).await;
                }
                Decision::Cancel(intent) => self.route_cancel(strategy_name, intent).await,
                Decision::Update(intent) => self.route_update(strategy_name, intent).await,
            }
        }
    }

    fn strategy_id(&self, strategy_name: &str) -> Option<String> {
        self.strategies.read().get(strategy_name).and_then(|e| e.descriptor.strategy_id.clone())
    }

    // ---- Order pipeline -----------------------------------------------------

    async fn route_order(&self, strategy_name: &str, side: Side, intent: OrderIntent) -> Option<Order> {
        if self.state() != EngineState::Running {
            self.report_strategy_error(
                strategy_name,
                EngineError::EngineNotReady { state: self.state().to_string() }.to_string(),
            );
            return None;
        }

        let descriptor = self.strategies.read().get(strategy_name).map(|e| e.descriptor.clone())?;

        let venue_id = intent
            .venue
            .clone()
            .or_else(|| descriptor.context.venues.clone().into_vec().into_iter().next())
            .or_else(|| {
                self.venues
                    .read()
                    .values()
                    .find(|adapter| adapter.is_connected())
                    .map(|adapter| adapter.name().clone())
            });
        let Some(venue_id) = venue_id else {
            self.report_strategy_error(strategy_name, "no venue available to route order".to_string());
            return None;
        };
        let adapter = self.venues.read().get(&venue_id).cloned();
        let Some(adapter) = adapter else {
            self.report_strategy_error(strategy_name, format!("venue `{venue_id}` not attached"));
            return None;
        };

        let symbol = intent.symbol.clone().unwrap_or_else(|| descriptor.context.symbol.clone());

        let rules = match self.symbol_cache.get(&adapter, &venue_id, &symbol, Utc::now()).await {
            Ok(rules) => rules,
            Err(err) => {
                self.report_strategy_error(strategy_name, err.to_string());
                return None;
            }
        };

        let kind = if intent.price.is_some() { OrderType::Limit } else { OrderType::Market };
        let (quantity, price) = match self.precision.validate_order(kind, intent.quantity, intent.price, &rules) {
            Ok(ok) => ok,
            Err(err) => {
                self.report_strategy_error(strategy_name, err.to_string());
                return None;
            }
        };

        let pending = Order {
            id: OrderId(String::new()),
            client_order_id: None,
            venue: venue_id.clone(),
            symbol: symbol.clone(),
            side,
            kind,
            quantity,
            price,
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            status: OrderStatus::New,
            executed_quantity: rust_decimal::Decimal::ZERO,
            cumulative_quote_quantity: rust_decimal::Decimal::ZERO,
            average_price: None,
            update_time: None,
            provenance: OrderProvenance::default(),
        };

        let account = self.risk_account.read().clone();
        let limits = *self.risk_limits.read();
        match self.risk.check_order(&pending, &account, &limits) {
            Ok(Some(exceeded)) => {
                let critical = exceeded.severity == RiskSeverity::Critical;
                self.bus.publish(EngineEvent::RiskLimitExceeded(RiskLimitEvent {
                    strategy_name: Some(strategy_name.to_string()),
                    exceeded: exceeded.clone(),
                }));
                if critical {
                    self.trigger_emergency_stop(format!(
                        "critical risk limit `{}` near breach for strategy `{strategy_name}`: {} approaching {}",
                        exceeded.limit, exceeded.offered, exceeded.threshold
                    ))
                    .await;
                }
            }
            Ok(None) => {}
            Err(rejected) => {
                let critical = rejected.severity == RiskSeverity::Critical;
                self.bus.publish(EngineEvent::RiskLimitExceeded(RiskLimitEvent {
                    strategy_name: Some(strategy_name.to_string()),
                    exceeded: rejected.clone().into(),
                }));
                self.report_strategy_error(strategy_name, rejected.to_string());
                if critical {
                    self.trigger_emergency_stop(format!(
                        "critical risk limit `{}` breached for strategy `{strategy_name}`: {} exceeds {}",
                        rejected.limit, rejected.offered, rejected.threshold
                    ))
                    .await;
                }
                return None;
            }
        }

        let client_order_id = match intent.client_order_id {
            Some(raw) => match ClientOrderId::new(raw) {
                Ok(id) => id,
                Err(err) => {
                    self.report_strategy_error(strategy_name, err.to_string());
                    return None;
                }
            },
            None => ClientOrderId::generate(descriptor.strategy_id.as_deref(), Utc::now().timestamp_millis()),
        };

        let options = OrderOptions { trade_mode: intent.trade_mode, leverage: intent.leverage };
        let created = adapter
            .create_order(&symbol, side, kind, quantity, price, TimeInForce::Gtc, client_order_id, options)
            .await;

        let mut order = match created {
            Ok(order) => order,
            Err(err) => {
                self.report_strategy_error(strategy_name, err.to_string());
                return None;
            }
        };

        order.provenance = OrderProvenance::new(
            descriptor.strategy_id.clone(),
            Some(descriptor.strategy_name.clone()),
            Some(descriptor.strategy_type.clone()),
            descriptor.user_id.clone(),
        );
        order.venue = venue_id;

        self.orders.write().upsert(order.clone());
        self.gate_and_publish_created(order.clone());

        let strategy = self.strategies.read().get(strategy_name).map(|e| e.strategy.clone());
        if let Some(strategy) = strategy {
            strategy.lock().await.on_order_created(&order).await;
        }

        Some(order)
    }

    async fn route_cancel(&self, strategy_name: &str, intent: CancelIntent) {
        if self.state() != EngineState::Running {
            self.report_strategy_error(
                strategy_name,
                EngineError::EngineNotReady { state: self.state().to_string() }.to_string(),
            );
            return;
        }

        let descriptor = self.strategies.read().get(strategy_name).map(|e| e.descriptor.clone());
        let Some(descriptor) = descriptor else { return };
        let symbol = intent.symbol.unwrap_or_else(|| descriptor.context.symbol.clone());

        let target = {
            let orders = self.orders.read();
            let candidates = orders.by_symbol(&symbol);
            candidates
                .into_iter()
                .find(|o| {
                    intent.order_id.as_deref().map(|id| o.id.as_str() == id).unwrap_or(false)
                        || intent
                            .client_order_id
                            .as_deref()
                            .map(|cid| o.client_order_id.as_ref().map(ClientOrderId::as_str) == Some(cid))
                            .unwrap_or(false)
                })
                .cloned()
        };

        let Some(order) = target else {
            self.report_strategy_error(strategy_name, "cancel target not found".to_string());
            return;
        };

        let Some(adapter) = self.venues.read().get(&order.venue).cloned() else {
            self.report_strategy_error(strategy_name, format!("venue `{}` not attached", order.venue));
            return;
        };

        if let Err(err) = adapter.cancel_order(&symbol, Some(&order.id), order.client_order_id.as_ref()).await {
            self.report_strategy_error(strategy_name, err.to_string());
        }
    }

    async fn route_update(&self, strategy_name: &str, intent: UpdateIntent) {
        if self.state() != EngineState::Running {
            self.report_strategy_error(
                strategy_name,
                EngineError::EngineNotReady { state: self.state().to_string() }.to_string(),
            );
            return;
        }

        let existing = {
            let orders = self.orders.read();
            orders
                .open_orders()
                .into_iter()
                .find(|o| o.client_order_id.as_ref().map(ClientOrderId::as_str) == Some(intent.client_order_id.as_str()))
                .cloned()
        };

        let Some(existing) = existing else {
            self.report_strategy_error(strategy_name, "update target not found".to_string());
            return;
        };

        if let Some(adapter) = self.venues.read().get(&existing.venue).cloned() {
            if let Err(err) = adapter.cancel_order(&existing.symbol, Some(&existing.id), existing.client_order_id.as_ref()).await {
                self.report_strategy_error(strategy_name, err.to_string());
                return;
            }
        }

        let replacement = OrderIntent {
            quantity: intent.quantity,
            price: intent.price,
            trade_mode: None,
            leverage: None,
            client_order_id: intent.new_client_order_id,
            reason: intent.reason,
            confidence: None,
            symbol: intent.symbol.or(Some(existing.symbol.clone())),
            venue: Some(existing.venue.clone()),
        };
        self.route_order(strategy_name, existing.side, replacement).await;
    }

    fn gate_and_publish_created(&self, order: Order) {
        let key = order.created_gate_key().to_string();
        let already_created = self.created_gate.read().contains(&key);
        if !already_created && !order.status.is_terminal_non_created() {
            self.created_gate.write().insert(key);
            self.bus.publish(EngineEvent::OrderCreated(order));
        }
    }

    fn report_strategy_error(&self, strategy_name: &str, message: String) {
        let error = vantage_strategy::StrategyError::new(strategy_name.to_string(), message);
        self.bus.publish(EngineEvent::StrategyError(error));
    }

    // ---- Account/user-data event routing -------------------------------------

    pub async fn on_order_update(&self, venue: VenueId, update: OrderUpdate) {
        if self.state() != EngineState::Running {
            self.pending_account_messages.write().push_back(AccountMessage::Order { venue, update });
            return;
        }
        self.process_order_update(venue, update).await;
    }

    pub async fn on_balance_update(&self, venue: VenueId, balances: Vec<AssetBalance>, account: Vec<Balance>) {
        if self.state() != EngineState::Running {
            self.pending_account_messages.write().push_back(AccountMessage::Balance { venue, balances, account });
            return;
        }
        self.process_balance_update(venue, balances, account).await;
    }

    pub async fn on_position_update(&self, venue: VenueId, positions: Vec<Position>) {
        if self.state() != EngineState::Running {
            self.pending_account_messages.write().push_back(AccountMessage::Position { venue, positions });
            return;
        }
        self.process_position_update(venue, positions).await;
    }

    async fn flush_pending_account_messages(&self) {
        let messages: Vec<AccountMessage> = self.pending_account_messages.write().drain(..).collect();
        for message in messages {
            match message {
                AccountMessage::Order { venue, update } => self.process_order_update(venue, update).await,
                AccountMessage::Balance { venue, balances, account } => self.process_balance_update(venue, balances, account).await,
                AccountMessage::Position { venue, positions } => self.process_position_update(venue, positions).await,
            }
        }
    }

    async fn process_order_update(&self, venue: VenueId, mut update: OrderUpdate) {
        if update.provenance.strategy_id.is_none() {
            if let Some(client_order_id) = update.client_order_id.as_ref() {
                if let Some(strategy_id) = decode_strategy_id(client_order_id.as_str()) {
                    let found = self
                        .strategies
                        .read()
                        .values()
                        .find(|e| e.descriptor.strategy_id.as_deref() == Some(strategy_id.as_str()))
                        .map(|e| e.descriptor.clone());
                    if let Some(descriptor) = found {
                        update.provenance.strategy_id = Some(strategy_id);
                        update.provenance.strategy_name = Some(descriptor.strategy_name.clone());
                        update.provenance.strategy_type = Some(descriptor.strategy_type.clone());
                        update.provenance.user_id = descriptor.user_id.clone();
                    }
                }
            }
        }

        let prior = self.orders.read().get(&update.id).cloned();
        let merged = Order::from_update(prior.as_ref(), update);
        self.orders.write().upsert(merged.clone());

        if let Some(trade) = synthesize_trade(prior.as_ref(), &merged, Utc::now()) {
            self.bus.publish(EngineEvent::TradeUpdate(TradeUpdate {
                venue: venue.clone(),
                symbol: merged.symbol.clone(),
                trades: vec![trade.clone()],
            }));
            self.notify_trade(&merged, &trade).await;
            if let Some(strategy_name) = merged.provenance.strategy_name.clone() {
                if let Some(entry) = self.strategies.read().get(&strategy_name) {
                    let strategy = entry.strategy.clone();
                    self.performance_debounce.schedule(strategy_name.clone(), move || {
                        if let Ok(guard) = strategy.try_lock() {
                            let performance = guard.performance();
                            debug!(
                                strategy = %strategy_name,
                                realized_pnl = %performance.realized_pnl,
                                trade_count = performance.trade_count,
                                "persisting debounced performance snapshot"
                            );
                        }
                    });
                }
            }
        }

        self.gate_and_publish_created(merged.clone());

        let status_event = match merged.status {
            OrderStatus::Filled => Some(EngineEvent::OrderFilled(merged.clone())),
            OrderStatus::PartiallyFilled => Some(EngineEvent::OrderPartiallyFilled(merged.clone())),
            OrderStatus::Canceled => Some(EngineEvent::OrderCancelled(merged.clone())),
            OrderStatus::Rejected => Some(EngineEvent::OrderRejected(merged.clone())),
            OrderStatus::New | OrderStatus::Expired => None,
        };
        let status_changed = prior.as_ref().map(|p| p.status != merged.status).unwrap_or(true);
        if status_changed {
            if let Some(event) = status_event {
                self.bus.publish(event);
            }
            if merged.status == OrderStatus::Filled {
                self.notify_order_filled(&merged).await;
            }
        }

        let strategy_names: Vec<String> = self
            .strategies
            .read()
            .values()
            .filter(|e| e.descriptor.context.venues.clone().into_vec().contains(&venue))
            .map(|e| e.descriptor.strategy_name.clone())
            .collect();
        for name in strategy_names {
            let strategy = self.strategies.read().get(&name).map(|e| e.strategy.clone());
            if let Some(strategy) = strategy {
                let orders = vec![merged.clone()];
                strategy.lock().await.analyze(AnalyzeInput::Orders { venue: venue.clone(), orders }).await.ok();
            }
        }
    }

    async fn notify_trade(&self, order: &Order, trade: &Trade) {
        let strategy = order
            .provenance
            .strategy_name
            .as_ref()
            .and_then(|name| self.strategies.read().get(name).map(|e| e.strategy.clone()));
        if let Some(strategy) = strategy {
            strategy.lock().await.on_trade_executed(trade).await;
        }
    }

    async fn notify_order_filled(&self, order: &Order) {
        let strategy = order
            .provenance
            .strategy_name
            .as_ref()
            .and_then(|name| self.strategies.read().get(name).map(|e| e.strategy.clone()));
        if let Some(strategy) = strategy {
            strategy.lock().await.on_order_filled(order).await;
        }
    }

    async fn process_balance_update(&self, venue: VenueId, balances: Vec<AssetBalance>, account: Vec<Balance>) {
        self.bus.publish(EngineEvent::BalanceUpdate(BalanceUpdate { venue: venue.clone(), balances: balances.clone(), account: account.clone() }));
        let strategies: Vec<Arc<AsyncMutex<Box<dyn Strategy>>>> = self
            .strategies
            .read()
            .values()
            .filter(|e| e.descriptor.context.venues.clone().into_vec().contains(&venue))
            .map(|e| e.strategy.clone())
            .collect();
        for strategy in strategies {
            strategy
                .lock()
                .await
                .analyze(AnalyzeInput::Balances { venue: venue.clone(), balances: balances.clone() })
                .await
                .ok();
        }
    }

    async fn process_position_update(&self, venue: VenueId, positions: Vec<Position>) {
        self.bus.publish(EngineEvent::PositionUpdate(PositionUpdate { venue: venue.clone(), positions: positions.clone() }));
        let strategies: Vec<Arc<AsyncMutex<Box<dyn Strategy>>>> = self
            .strategies
            .read()
            .values()
            .filter(|e| e.descriptor.context.venues.clone().into_vec().contains(&venue))
            .map(|e| e.strategy.clone())
            .collect();
        for strategy in strategies {
            strategy
                .lock()
                .await
                .analyze(AnalyzeInput::Positions { venue: venue.clone(), positions: positions.clone() })
                .await
                .ok();
        }
    }

    /// Deprecated untyped market-data entry point, kept for callers that
    /// have not migrated to `on_ticker`/`on_order_book`/`on_trades`/
    /// `on_klines`. Dispatches by structural shape; new code must not rely
    /// on this.
    #[deprecated(note = "use the typed on_ticker/on_order_book/on_trades/on_klines methods")]
    pub async fn on_market_data(&self, venue: VenueId, symbol: Symbol, payload: serde_json::Value) {
        let obj = payload.as_object();
        let has = |key: &str| obj.map(|o| o.contains_key(key)).unwrap_or(false);

        if has("price") && has("volume") && has("timestamp") {
            if let Ok(ticker) = serde_json::from_value::<TickerShape>(payload.clone()) {
                let ticker = ticker.into_ticker(&symbol);
                self.on_ticker(venue, symbol, ticker).await;
                return;
            }
        }
        if has("bids") && has("asks") {
            debug!(venue = %venue, symbol = %symbol, "deprecated onMarketData orderbook payload ignored: shape not convertible");
            return;
        }
        if has("open") && has("high") && has("low") && has("close") && has("interval") {
            debug!(venue = %venue, symbol = %symbol, "deprecated onMarketData kline payload ignored: shape not convertible");
            return;
        }
        if payload.is_array() {
            debug!(venue = %venue, symbol = %symbol, "deprecated onMarketData trades payload ignored: shape not convertible");
            return;
        }
        warn!(venue = %venue, symbol = %symbol, "deprecated onMarketData payload matched no known structural shape");
    }
}

#[derive(serde::Deserialize)]
struct TickerShape {
    price: rust_decimal::Decimal,
    volume: rust_decimal::Decimal,
    timestamp: chrono::DateTime<Utc>,
}

impl TickerShape {
    fn into_ticker(self, symbol: &Symbol) -> Ticker {
        Ticker { symbol: symbol.clone(), price: self.price, volume: self.volume, timestamp: self.timestamp }
    }
}

impl Default for TradingEngine {
    fn default() -> Self {
        Self::new()
    }
}
