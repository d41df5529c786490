use actix_web::{rt, web, Error, HttpRequest, HttpResponse};

use crate::realtime::session::run_session;
use crate::realtime::OrderHub;

/// GET /ws
///
/// Upgrades to a WebSocket. Clients send
/// `{"event":"join_order_room","orderId":<id>}` to follow an order and then
/// receive `{"event":"order_status_updated","data":{"status":...}}` pushes.
pub async fn order_socket(
    req: HttpRequest,
    body: web::Payload,
    hub: web::Data<OrderHub>,
) -> Result<HttpResponse, Error> {
    let (response, session, messages) = actix_ws::handle(&req, body)?;
    let hub = hub.get_ref().clone();
    rt::spawn(run_session(hub, session, messages));
    Ok(response)
}
