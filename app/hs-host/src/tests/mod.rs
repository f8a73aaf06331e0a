mod lock;

use hs_server::AxumServerFactory;
use hs_supervisor::{FixedAddressResolver, LifecycleSupervisor, ServerService, StopPolicy};

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Service over a real embedded server bound to loopback.
pub(crate) fn loopback_service() -> Arc<ServerService> {
    let supervisor = Arc::new(LifecycleSupervisor::new(
        Arc::new(AxumServerFactory::new(LOOPBACK)),
        Arc::new(FixedAddressResolver(LOOPBACK)),
        StopPolicy::new(Duration::from_millis(100), Duration::from_millis(300)),
    ));
    Arc::new(ServerService::spawn(supervisor))
}

/// Poll `condition` until it holds or a second passes.
pub(crate) async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}
