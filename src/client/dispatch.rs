//! Direct-vs-relay decision for callers.

use serde::Serialize;

use crate::descriptor::RequestDescriptor;
use crate::forward::Executor;
use crate::outcome::ExecutionResult;
use crate::routing::Destination;

use super::relay::RelayClient;

/// How a request actually left the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Direct,
    Relayed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dispatched {
    pub destination: Destination,
    pub route: Route,
    pub result: ExecutionResult,
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    executor: Executor,
    relay: RelayClient,
    force_relay: bool,
}

impl Dispatcher {
    pub fn new(executor: Executor, relay: RelayClient) -> Self {
        Self {
            executor,
            relay,
            force_relay: false,
        }
    }

    /// Send even local targets through the relay.
    pub fn force_relay(mut self, force: bool) -> Self {
        self.force_relay = force;
        self
    }

    pub fn route_for(&self, descriptor: &RequestDescriptor) -> (Destination, Route) {
        let destination = Destination::for_url(descriptor.url());
        let route = if destination.is_local() && !self.force_relay {
            Route::Direct
        } else {
            Route::Relayed
        };
        (destination, route)
    }

    pub async fn dispatch(&self, descriptor: &RequestDescriptor) -> Dispatched {
        let (destination, route) = self.route_for(descriptor);
        let result = match route {
            Route::Direct => self.executor.execute(descriptor).await,
            Route::Relayed => self.relay.forward(descriptor).await,
        };
        Dispatched {
            destination,
            route,
            result,
        }
    }
}
