//! Live metrics stream handler
//!
//! Keeps one push connection per campaign and exposes the latest insight
//! snapshot together with the connection state.
//!
//! ## Lifecycle
//!
//! ```text
//! activate ──► Connecting ──open──► Live ◄──message──┐
//!                  │                 │ └─────────────┘
//!                  └──error──► Reconnecting ◄──error─┘
//!                                    │ offline_delay
//!                                    ▼
//!                                 Offline ──(Reconnect policy)──► open again
//! ```
//!
//! A single driver task owns the connection and is the only writer of the
//! state cell. Dropping the [`LiveInsights`] handle (or calling
//! [`LiveInsights::deactivate`]) aborts that task, which closes the connection
//! and cancels any pending offline timer.

use chrono::Utc;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::StreamError;
use super::state::{ConnectionState, LiveView};
use super::transport::{EventStream, InsightTransport};
use crate::models::CampaignInsight;

/// What the handler does once the offline delay has elapsed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReconnectPolicy {
    /// Flip to offline, then open a fresh connection
    #[default]
    Reconnect,
    /// Flip to offline and stay there until reactivated
    OfflineOnly,
}

impl std::str::FromStr for ReconnectPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reconnect" => Ok(ReconnectPolicy::Reconnect),
            "offline-only" | "offline_only" => Ok(ReconnectPolicy::OfflineOnly),
            other => Err(format!(
                "Invalid reconnect policy: {}. Use reconnect or offline-only",
                other
            )),
        }
    }
}

/// Timing and recovery options for live handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Time spent in `Reconnecting` before the state becomes `Offline`
    pub offline_delay: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            offline_delay: Duration::from_millis(2000),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Build the stream URL for a campaign
pub fn stream_url(base_url: &str, campaign_id: &str) -> String {
    format!(
        "{}/campaigns/{}/insights/stream",
        base_url.trim_end_matches('/'),
        urlencoding::encode(campaign_id)
    )
}

/// Where live handlers connect to and how they recover
#[derive(Clone)]
pub struct InsightSource {
    base_url: String,
    transport: Arc<dyn InsightTransport>,
    options: StreamOptions,
}

impl InsightSource {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn InsightTransport>,
        options: StreamOptions,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            options,
        }
    }

    pub fn stream_url(&self, campaign_id: &str) -> String {
        stream_url(&self.base_url, campaign_id)
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Shorthand for [`LiveInsights::activate`]
    pub fn activate(
        &self,
        campaign_id: impl Into<String>,
        initial: Option<CampaignInsight>,
    ) -> LiveInsights {
        LiveInsights::activate(self.clone(), campaign_id, initial)
    }
}

/// Single-writer state cell
///
/// Writes are dropped once the owning handle has been deactivated, so a driver
/// task that is mid-poll while being aborted cannot publish a late change.
struct StateCell {
    tx: watch::Sender<LiveView>,
    active: Mutex<bool>,
}

impl StateCell {
    fn new(initial: LiveView) -> (Self, watch::Receiver<LiveView>) {
        let (tx, rx) = watch::channel(initial);
        let cell = Self {
            tx,
            active: Mutex::new(true),
        };
        (cell, rx)
    }

    /// Apply `modify` if still active; it returns whether anything changed
    fn update(&self, modify: impl FnOnce(&mut LiveView) -> bool) {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if *active {
            self.tx.send_if_modified(modify);
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.update(|view| {
            if view.state == state {
                return false;
            }
            view.state = state;
            true
        });
    }

    fn close(&self) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }

    fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Live insight stream for one campaign
///
/// Must be activated from within a tokio runtime.
pub struct LiveInsights {
    campaign_id: String,
    source: InsightSource,
    cell: Arc<StateCell>,
    rx: watch::Receiver<LiveView>,
    task: Option<JoinHandle<()>>,
}

impl LiveInsights {
    /// Start streaming insights for `campaign_id`
    ///
    /// `initial` is shown until the first message arrives.
    pub fn activate(
        source: InsightSource,
        campaign_id: impl Into<String>,
        initial: Option<CampaignInsight>,
    ) -> Self {
        let campaign_id = campaign_id.into();
        let (cell, rx) = StateCell::new(LiveView::connecting(initial));
        let cell = Arc::new(cell);

        tracing::debug!(campaign_id = %campaign_id, "Activating live insights");

        let task = tokio::spawn(drive(
            Arc::clone(&cell),
            source.clone(),
            campaign_id.clone(),
        ));

        Self {
            campaign_id,
            source,
            cell,
            rx,
            task: Some(task),
        }
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    /// Current view (state, snapshot, last update)
    pub fn view(&self) -> LiveView {
        self.rx.borrow().clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.rx.borrow().state
    }

    pub fn insight(&self) -> Option<CampaignInsight> {
        self.rx.borrow().insight.clone()
    }

    /// Receiver that observes every later update
    ///
    /// The current view counts as already seen. Receivers stay tied to this
    /// activation; after a campaign switch, subscribe again.
    pub fn subscribe(&self) -> watch::Receiver<LiveView> {
        self.cell.tx.subscribe()
    }

    /// Wait for the next update, `None` once deactivated
    pub async fn changed(&mut self) -> Option<LiveView> {
        if !self.cell.is_active() {
            return None;
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Close the current connection and start over for another campaign
    ///
    /// Nothing is carried over from the previous campaign. Switching to the
    /// current id is a no-op.
    pub fn switch_campaign(&mut self, campaign_id: impl Into<String>) {
        let campaign_id = campaign_id.into();
        if campaign_id == self.campaign_id && self.is_active() {
            return;
        }

        tracing::debug!(
            from = %self.campaign_id,
            to = %campaign_id,
            "Switching live insights campaign"
        );
        *self = Self::activate(self.source.clone(), campaign_id, None);
    }

    /// Close the connection and cancel any pending state transition
    pub fn deactivate(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.cell.close();
        task.abort();
        tracing::debug!(campaign_id = %self.campaign_id, "Live insights deactivated");
    }
}

impl Drop for LiveInsights {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Driver task: connect, pump, recover
async fn drive(cell: Arc<StateCell>, source: InsightSource, campaign_id: String) {
    let url = source.stream_url(&campaign_id);
    let options = source.options;

    loop {
        let connection_id = Uuid::new_v4().to_string();
        tracing::debug!(
            campaign_id = %campaign_id,
            connection_id = %connection_id,
            url = %url,
            "Opening insight stream"
        );

        let failure = match source.transport.open(&url).await {
            Ok(events) => {
                tracing::info!(
                    campaign_id = %campaign_id,
                    connection_id = %connection_id,
                    "Insight stream live"
                );
                cell.set_state(ConnectionState::Live);
                pump(&cell, events, &campaign_id, &connection_id).await
            }
            Err(e) => e,
        };

        // The failed connection was dropped inside `pump` (or never opened)
        tracing::warn!(
            campaign_id = %campaign_id,
            connection_id = %connection_id,
            error = %failure,
            "Insight stream failed"
        );
        cell.set_state(ConnectionState::Reconnecting);

        tokio::time::sleep(options.offline_delay).await;
        cell.set_state(ConnectionState::Offline);

        match options.reconnect {
            ReconnectPolicy::Reconnect => {
                tracing::info!(campaign_id = %campaign_id, "Reattempting insight stream");
            }
            ReconnectPolicy::OfflineOnly => {
                tracing::info!(
                    campaign_id = %campaign_id,
                    "Insight stream offline, waiting for reactivation"
                );
                return;
            }
        }
    }
}

/// Apply events until the connection fails; returns the failure
async fn pump(
    cell: &StateCell,
    mut events: EventStream,
    campaign_id: &str,
    connection_id: &str,
) -> StreamError {
    while let Some(item) = events.next().await {
        match item {
            Ok(event) if event.is_message() => apply_message(cell, &event.data, campaign_id),
            Ok(event) => {
                tracing::debug!(
                    campaign_id = %campaign_id,
                    connection_id = %connection_id,
                    event = ?event.event,
                    "Ignoring named event"
                );
            }
            Err(e) => return e,
        }
    }

    StreamError::Closed
}

fn apply_message(cell: &StateCell, payload: &str, campaign_id: &str) {
    let insight = match CampaignInsight::from_json(payload) {
        Ok(insight) => insight,
        Err(e) => {
            tracing::warn!(
                campaign_id = %campaign_id,
                error = %e,
                "Dropping malformed insight message"
            );
            return;
        }
    };

    let last_updated = insight
        .timestamp
        .clone()
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    cell.update(|view| {
        view.insight = Some(insight);
        view.last_updated = Some(last_updated);
        view.state = ConnectionState::Live;
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sse::SseEvent;
    use async_trait::async_trait;
    use futures_util::Stream;
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_millis(2000);

    type Feed = mpsc::UnboundedSender<Result<SseEvent, StreamError>>;

    /// One scripted connection; counts itself closed when dropped
    struct MockConnection {
        rx: mpsc::UnboundedReceiver<Result<SseEvent, StreamError>>,
        closed: Arc<AtomicUsize>,
    }

    impl Stream for MockConnection {
        type Item = Result<SseEvent, StreamError>;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            self.get_mut().rx.poll_recv(cx)
        }
    }

    impl Drop for MockConnection {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum Script {
        Open(MockConnection),
        Refuse,
    }

    /// Transport that replays scripted connection attempts in order
    ///
    /// Once the script is exhausted, further attempts never complete.
    #[derive(Default)]
    struct MockTransport {
        script: Mutex<VecDeque<Script>>,
        urls: Mutex<Vec<String>>,
        opened: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    impl MockTransport {
        fn connection(&self) -> Feed {
            let (tx, rx) = mpsc::unbounded_channel();
            self.script.lock().unwrap().push_back(Script::Open(MockConnection {
                rx,
                closed: Arc::clone(&self.closed),
            }));
            tx
        }

        fn refusal(&self) {
            self.script.lock().unwrap().push_back(Script::Refuse);
        }

        fn opened(&self) -> usize {
            self.opened.load(Ordering::SeqCst)
        }

        fn closed(&self) -> usize {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InsightTransport for MockTransport {
        async fn open(&self, url: &str) -> Result<EventStream, StreamError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Script::Open(conn)) => Ok(Box::pin(conn)),
                Some(Script::Refuse) => Err(StreamError::Transport("refused".into())),
                None => futures_util::future::pending().await,
            }
        }
    }

    fn source(transport: &Arc<MockTransport>, reconnect: ReconnectPolicy) -> InsightSource {
        InsightSource::new(
            "http://api.test/",
            Arc::clone(transport) as Arc<dyn InsightTransport>,
            StreamOptions {
                offline_delay: DELAY,
                reconnect,
            },
        )
    }

    fn insight(impressions: u64, timestamp: &str) -> CampaignInsight {
        CampaignInsight {
            impressions,
            clicks: 10,
            conversions: 1,
            spend: 50.0,
            ctr: 0.1,
            cpc: 5.0,
            conversion_rate: 0.1,
            timestamp: Some(timestamp.to_string()),
        }
    }

    fn message(insight: &CampaignInsight) -> Result<SseEvent, StreamError> {
        Ok(SseEvent::message(serde_json::to_string(insight).unwrap()))
    }

    /// Let every runnable task finish before the clock moves
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    async fn wait_for_state(live: &LiveInsights, state: ConnectionState) {
        let mut rx = live.subscribe();
        rx.wait_for(|v| v.state == state).await.unwrap();
    }

    #[test]
    fn test_stream_url() {
        assert_eq!(
            stream_url("http://api.test/", "c1"),
            "http://api.test/campaigns/c1/insights/stream"
        );
        assert_eq!(
            stream_url("http://api.test", "a b/c"),
            "http://api.test/campaigns/a%20b%2Fc/insights/stream"
        );
    }

    #[test]
    fn test_reconnect_policy_parse() {
        assert_eq!(
            "offline-only".parse::<ReconnectPolicy>().unwrap(),
            ReconnectPolicy::OfflineOnly
        );
        assert_eq!(
            "Reconnect".parse::<ReconnectPolicy>().unwrap(),
            ReconnectPolicy::Reconnect
        );
        assert!("sometimes".parse::<ReconnectPolicy>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_goes_live_without_messages() {
        let transport = Arc::new(MockTransport::default());
        let _feed = transport.connection();

        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        assert_eq!(live.state(), ConnectionState::Connecting);

        wait_for_state(&live, ConnectionState::Live).await;
        assert!(live.insight().is_none());
        assert_eq!(
            transport.urls.lock().unwrap().as_slice(),
            ["http://api.test/campaigns/c1/insights/stream"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_snapshot_shown_while_connecting() {
        let transport = Arc::new(MockTransport::default());
        let initial = insight(7, "T0");

        let live = LiveInsights::activate(
            source(&transport, ReconnectPolicy::Reconnect),
            "c1",
            Some(initial.clone()),
        );
        settle().await;

        let view = live.view();
        assert_eq!(view.state, ConnectionState::Connecting);
        assert_eq!(view.insight, Some(initial));
        assert_eq!(view.last_updated.as_deref(), Some("T0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_message_replaces_snapshot() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        let first = insight(100, "T1");
        let mut second = insight(250, "T2");
        second.clicks = 0;

        feed.send(message(&first)).unwrap();
        settle().await;
        assert_eq!(live.insight(), Some(first));

        feed.send(message(&second)).unwrap();
        settle().await;

        let view = live.view();
        assert_eq!(view.insight, Some(second));
        assert_eq!(view.last_updated.as_deref(), Some("T2"));
        assert_eq!(view.state, ConnectionState::Live);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_without_timestamp_uses_receive_time() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        let mut snapshot = insight(1, "unused");
        snapshot.timestamp = None;
        feed.send(message(&snapshot)).unwrap();
        settle().await;

        let last_updated = live.view().last_updated.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&last_updated).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_float_encoded_counters_replace_snapshot() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        let payload = r#"{"impressions":100.0,"clicks":10.0,"conversions":1,"spend":50.0,"ctr":0.1,"cpc":5.0,"conversion_rate":0.1,"timestamp":"T1"}"#;
        feed.send(Ok(SseEvent::message(payload))).unwrap();
        settle().await;

        let view = live.view();
        assert_eq!(view.insight, Some(insight(100, "T1")));
        assert_eq!(view.last_updated.as_deref(), Some("T1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_only_later_updates() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        feed.send(message(&insight(100, "T1"))).unwrap();
        settle().await;

        let mut rx = live.subscribe();
        assert!(!rx.has_changed().unwrap());

        feed.send(message(&insight(200, "T2"))).unwrap();
        settle().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().insight, Some(insight(200, "T2")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_message_changes_nothing() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        feed.send(message(&insight(100, "T1"))).unwrap();
        settle().await;
        let before = live.view();
        let mut rx = live.subscribe();

        feed.send(Ok(SseEvent::message("{not json"))).unwrap();
        feed.send(Ok(SseEvent::message(r#"{"impressions":5}"#))).unwrap();
        settle().await;

        assert_eq!(live.view(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_named_events_ignored() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        let snapshot = serde_json::to_string(&insight(9, "T9")).unwrap();
        feed.send(Ok(SseEvent::message(snapshot).named("heartbeat"))).unwrap();
        settle().await;

        assert!(live.insight().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_goes_offline_after_exact_delay() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::OfflineOnly), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        feed.send(Err(StreamError::Transport("reset".into()))).unwrap();
        wait_for_state(&live, ConnectionState::Reconnecting).await;
        let failed_at = Instant::now();
        assert_eq!(transport.closed(), 1);

        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(live.state(), ConnectionState::Reconnecting);

        wait_for_state(&live, ConnectionState::Offline).await;
        assert_eq!(failed_at.elapsed(), DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_closing_stream_counts_as_error() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::OfflineOnly), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        drop(feed);
        wait_for_state(&live, ConnectionState::Reconnecting).await;
        wait_for_state(&live, ConnectionState::Offline).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_connection_goes_reconnecting() {
        let transport = Arc::new(MockTransport::default());
        transport.refusal();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::OfflineOnly), "c1", None);

        wait_for_state(&live, ConnectionState::Reconnecting).await;
        wait_for_state(&live, ConnectionState::Offline).await;
        assert_eq!(transport.opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_only_never_reopens() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let _spare = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::OfflineOnly), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        feed.send(Err(StreamError::Closed)).unwrap();
        wait_for_state(&live, ConnectionState::Offline).await;

        tokio::time::sleep(DELAY * 10).await;
        assert_eq!(transport.opened(), 1);
        assert_eq!(live.state(), ConnectionState::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_policy_reopens_after_delay() {
        let transport = Arc::new(MockTransport::default());
        let first = transport.connection();
        let second = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        first.send(message(&insight(1, "T1"))).unwrap();
        first.send(Err(StreamError::Closed)).unwrap();
        wait_for_state(&live, ConnectionState::Reconnecting).await;
        assert_eq!(transport.opened(), 1);

        wait_for_state(&live, ConnectionState::Live).await;
        assert_eq!(transport.opened(), 2);
        assert_eq!(transport.closed(), 1);

        // Snapshot survives the reconnect until a newer one arrives
        assert_eq!(live.insight().map(|i| i.impressions), Some(1));
        second.send(message(&insight(2, "T2"))).unwrap();
        settle().await;
        assert_eq!(live.insight().map(|i| i.impressions), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_repeats_on_every_failure() {
        let transport = Arc::new(MockTransport::default());
        transport.refusal();
        transport.refusal();
        let _third = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);

        let started = Instant::now();
        wait_for_state(&live, ConnectionState::Live).await;

        // Fixed delay per failure, no backoff growth
        assert_eq!(started.elapsed(), DELAY * 2);
        assert_eq!(transport.opened(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_closes_connection_once() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let mut live =
            LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        live.deactivate();
        live.deactivate();
        settle().await;

        assert_eq!(transport.closed(), 1);
        assert!(!live.is_active());
        assert!(feed.send(message(&insight(1, "T1"))).is_err());
        assert!(live.changed().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_cancels_pending_offline() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let mut live =
            LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        feed.send(Err(StreamError::Closed)).unwrap();
        wait_for_state(&live, ConnectionState::Reconnecting).await;
        let rx = live.subscribe();

        live.deactivate();
        tokio::time::sleep(DELAY * 5).await;

        assert_eq!(live.state(), ConnectionState::Reconnecting);
        assert!(!rx.has_changed().unwrap_or(false));
        assert_eq!(transport.opened(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_closes_connection() {
        let transport = Arc::new(MockTransport::default());
        let _feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);
        wait_for_state(&live, ConnectionState::Live).await;

        drop(live);
        settle().await;
        assert_eq!(transport.closed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_campaign_starts_fresh() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let _other = transport.connection();
        let mut live = LiveInsights::activate(
            source(&transport, ReconnectPolicy::Reconnect),
            "c1",
            Some(insight(1, "T0")),
        );
        wait_for_state(&live, ConnectionState::Live).await;
        feed.send(message(&insight(100, "T1"))).unwrap();
        settle().await;

        live.switch_campaign("c2");
        assert_eq!(live.campaign_id(), "c2");
        assert_eq!(live.state(), ConnectionState::Connecting);
        assert!(live.insight().is_none());

        wait_for_state(&live, ConnectionState::Live).await;
        settle().await;
        assert_eq!(transport.closed(), 1);
        assert_eq!(
            transport.urls.lock().unwrap().last().map(String::as_str),
            Some("http://api.test/campaigns/c2/insights/stream")
        );

        // Same id again does not reconnect
        live.switch_campaign("c2");
        settle().await;
        assert_eq!(transport.opened(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changed_reports_updates() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let mut live =
            LiveInsights::activate(source(&transport, ReconnectPolicy::Reconnect), "c1", None);

        let view = live.changed().await.unwrap();
        assert_eq!(view.state, ConnectionState::Live);

        feed.send(message(&insight(3, "T3"))).unwrap();
        let view = live.changed().await.unwrap();
        assert_eq!(view.insight.map(|i| i.impressions), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_example_scenario() {
        let transport = Arc::new(MockTransport::default());
        let feed = transport.connection();
        let live = LiveInsights::activate(source(&transport, ReconnectPolicy::OfflineOnly), "c1", None);
        assert_eq!(live.state(), ConnectionState::Connecting);

        wait_for_state(&live, ConnectionState::Live).await;

        let payload = r#"{"impressions":100,"clicks":10,"conversions":1,"spend":50,"ctr":0.1,"cpc":5,"conversion_rate":0.1,"timestamp":"T1"}"#;
        feed.send(Ok(SseEvent::message(payload))).unwrap();
        settle().await;
        assert_eq!(live.insight(), Some(insight(100, "T1")));
        assert_eq!(live.state(), ConnectionState::Live);

        feed.send(Err(StreamError::Transport("reset".into()))).unwrap();
        wait_for_state(&live, ConnectionState::Reconnecting).await;
        let failed_at = Instant::now();

        wait_for_state(&live, ConnectionState::Offline).await;
        assert_eq!(failed_at.elapsed(), DELAY);
        assert_eq!(live.insight(), Some(insight(100, "T1")));
    }
}
