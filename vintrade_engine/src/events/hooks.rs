use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::task::JoinHandle;

use crate::events::{EventHandler, EventProducer, Handler, OrderReconciledEvent};

/// Subscriber callbacks, collected before the engine starts. Any number of callbacks may listen for the same event;
/// each gets its own channel, so a slow subscriber only ever loses its own notifications.
#[derive(Default, Clone)]
pub struct EventHooks {
    order_reconciled: Vec<Handler<OrderReconciledEvent>>,
}

impl EventHooks {
    pub fn on_order_reconciled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderReconciledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.order_reconciled.push(Arc::new(f));
        self
    }

    pub fn subscriber_count(&self) -> usize {
        self.order_reconciled.len()
    }
}

/// The receiving ends of the registered hooks.
///
/// Handlers stop once every [`EventProducers`] clone taken from them has been dropped, after finishing whatever was
/// already queued.
pub struct EventHandlers {
    order_reconciled: Vec<EventHandler<OrderReconciledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let order_reconciled =
            hooks.order_reconciled.into_iter().map(|f| EventHandler::new(buffer_size, f)).collect::<Vec<_>>();
        debug!("📬️ {} order reconciled subscriber(s) registered", order_reconciled.len());
        Self { order_reconciled }
    }

    pub fn producers(&self) -> EventProducers {
        EventProducers { order_reconciled: self.order_reconciled.iter().map(EventHandler::subscribe).collect() }
    }

    /// Runs every handler in the background for the life of the runtime.
    pub fn start_handlers(self) -> Vec<JoinHandle<()>> {
        self.order_reconciled.into_iter().map(|handler| tokio::spawn(handler.start_handler())).collect()
    }

    /// Runs every handler on the current task and returns once all of them have shut down. Call this after the
    /// producers are gone, to flush pending notifications before exiting.
    pub async fn drain(self) {
        for handler in self.order_reconciled {
            handler.start_handler().await;
        }
    }
}

/// The publishing side, handed to [`crate::ReconciliationApi`]. An empty `EventProducers` publishes nowhere.
#[derive(Default, Clone)]
pub struct EventProducers {
    order_reconciled: Vec<EventProducer<OrderReconciledEvent>>,
}

impl EventProducers {
    /// Offers the event to every subscriber and returns how many accepted it.
    pub fn publish_order_reconciled(&self, event: OrderReconciledEvent) -> usize {
        let order_id = event.order_id;
        let delivered = self.order_reconciled.iter().filter(|p| p.publish_event(event.clone())).count();
        if delivered < self.order_reconciled.len() {
            warn!(
                "📬️ Order #{order_id}: {} of {} subscribers missed the reconciliation notice",
                self.order_reconciled.len() - delivered,
                self.order_reconciled.len()
            );
        }
        delivered
    }

    pub fn is_empty(&self) -> bool {
        self.order_reconciled.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ReportSummary;

    fn event(order_id: i64) -> OrderReconciledEvent {
        let summary = ReportSummary {
            total_items: 1,
            matched_items: 1,
            unmatched_items: 0,
            losing_items: 0,
            total_sell_usd: Default::default(),
            total_buy_usd: Default::default(),
            total_profit_usd: Default::default(),
            profit_margin_percent: Default::default(),
        };
        OrderReconciledEvent::new(order_id, summary)
    }

    fn counting_hook(hooks: &mut EventHooks, count: Arc<AtomicUsize>) {
        hooks.on_order_reconciled(move |_| {
            let count = Arc::clone(&count);
            Box::pin(async move {
                count.fetch_add(1, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    }

    #[tokio::test]
    async fn every_subscriber_hears_every_event() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut hooks = EventHooks::default();
        counting_hook(&mut hooks, Arc::clone(&first));
        counting_hook(&mut hooks, Arc::clone(&second));
        assert_eq!(hooks.subscriber_count(), 2);
        let handlers = EventHandlers::new(4, hooks);
        let producers = handlers.producers();
        assert_eq!(producers.publish_order_reconciled(event(1)), 2);
        assert_eq!(producers.publish_order_reconciled(event(2)), 2);
        drop(producers);
        handlers.drain().await;
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn a_full_subscriber_does_not_starve_the_others() {
        let slow = Arc::new(AtomicUsize::new(0));
        let mut hooks = EventHooks::default();
        counting_hook(&mut hooks, Arc::clone(&slow));
        let handlers = EventHandlers::new(1, hooks);
        let mut other = EventHooks::default();
        let fast = Arc::new(AtomicUsize::new(0));
        counting_hook(&mut other, Arc::clone(&fast));
        let other_handlers = EventHandlers::new(8, other);
        let producers = EventProducers {
            order_reconciled: handlers
                .producers()
                .order_reconciled
                .into_iter()
                .chain(other_handlers.producers().order_reconciled)
                .collect(),
        };
        assert_eq!(producers.publish_order_reconciled(event(1)), 2);
        assert_eq!(producers.publish_order_reconciled(event(2)), 1);
        drop(producers);
        handlers.drain().await;
        other_handlers.drain().await;
        assert_eq!(slow.load(Ordering::SeqCst), 1);
        assert_eq!(fast.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn publishing_without_subscribers_reaches_nobody() {
        let producers = EventProducers::default();
        assert!(producers.is_empty());
        assert_eq!(producers.publish_order_reconciled(event(1)), 0);
    }
}
