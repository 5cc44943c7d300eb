use kameo::Actor;
use kameo::actor::ActorRef;
use kameo::error::{Infallible, SendError};
use kameo::message::{Context, Message};

use crate::domain::order::{Order, OrderStatus};
use crate::service::OrderService;
use crate::store::StoreError;

// ============================================================================
// Order Writer Actor - single writer for the order document
// ============================================================================
//
// Owns the OrderService. The mailbox processes one message at a time, so
// the read-modify-write cycles of concurrent callers never interleave.
//
// ============================================================================

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug)]
pub struct EnsureStorage;

#[derive(Debug)]
pub struct DrainNotifications;

#[derive(Debug)]
pub struct ListOrders;

#[derive(Debug)]
pub struct GetOrder {
    pub id: String,
}

#[derive(Debug)]
pub struct CreateOrder {
    pub order: Order,
}

#[derive(Debug)]
pub struct UpdateOrderStatus {
    pub id: String,
    pub status: OrderStatus,
}

// ============================================================================
// Actor
// ============================================================================

pub struct OrderWriter {
    service: OrderService,
}

impl OrderWriter {
    pub fn new(service: OrderService) -> Self {
        Self { service }
    }
}

impl Actor for OrderWriter {
    type Args = Self;
    type Error = Infallible;

    async fn on_start(state: Self::Args, _actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        tracing::info!(
            location = %state.service.store().location(),
            policy = ?state.service.store().policy(),
            "OrderWriter started"
        );
        Ok(state)
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<EnsureStorage> for OrderWriter {
    type Reply = Result<(), StoreError>;

    async fn handle(&mut self, _msg: EnsureStorage, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.service.store().ensure_storage().await
    }
}

impl Message<DrainNotifications> for OrderWriter {
    type Reply = ();

    async fn handle(&mut self, _msg: DrainNotifications, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.service.drain_notifications().await
    }
}

impl Message<ListOrders> for OrderWriter {
    type Reply = Result<Vec<Order>, StoreError>;

    async fn handle(&mut self, _msg: ListOrders, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.service.list_all().await
    }
}

impl Message<GetOrder> for OrderWriter {
    type Reply = Result<Option<Order>, StoreError>;

    async fn handle(&mut self, msg: GetOrder, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.service.get_by_id(&msg.id).await
    }
}

impl Message<CreateOrder> for OrderWriter {
    type Reply = Result<Order, StoreError>;

    async fn handle(&mut self, msg: CreateOrder, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        tracing::debug!(order_id = %msg.order.id, "Handling CreateOrder");
        self.service.create(msg.order).await
    }
}

impl Message<UpdateOrderStatus> for OrderWriter {
    type Reply = Result<Option<Order>, StoreError>;

    async fn handle(&mut self, msg: UpdateOrderStatus, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        tracing::debug!(order_id = %msg.id, status = %msg.status, "Handling UpdateOrderStatus");
        self.service.update_status(&msg.id, msg.status).await
    }
}

// ============================================================================
// Handle - typed facade over the actor reference
// ============================================================================

fn unwrap_reply<M: std::fmt::Debug>(err: SendError<M, StoreError>) -> StoreError {
    match err {
        SendError::HandlerError(e) => e,
        other => StoreError::WriterUnavailable(format!("{:?}", other)),
    }
}

#[derive(Clone)]
pub struct OrderWriterHandle {
    actor_ref: ActorRef<OrderWriter>,
}

impl OrderWriterHandle {
    pub fn spawn(service: OrderService) -> Self {
        let actor_ref = OrderWriter::spawn(OrderWriter::new(service));
        Self { actor_ref }
    }

    /// Create the backing document when missing. Used as the readiness probe.
    pub async fn ensure_storage(&self) -> Result<(), StoreError> {
        self.actor_ref.ask(EnsureStorage).send().await.map_err(unwrap_reply)
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        self.actor_ref.ask(ListOrders).send().await.map_err(unwrap_reply)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.actor_ref
            .ask(GetOrder { id: id.to_string() })
            .send()
            .await
            .map_err(unwrap_reply)
    }

    pub async fn create(&self, order: Order) -> Result<Order, StoreError> {
        self.actor_ref
            .ask(CreateOrder { order })
            .send()
            .await
            .map_err(unwrap_reply)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        self.actor_ref
            .ask(UpdateOrderStatus {
                id: id.to_string(),
                status,
            })
            .send()
            .await
            .map_err(unwrap_reply)
    }

    /// Wait for the notifications of every mutation handled so far.
    pub async fn drain_notifications(&self) {
        if let Err(e) = self.actor_ref.ask(DrainNotifications).send().await {
            tracing::warn!(error = ?e, "Could not drain notifications");
        }
    }

    /// Let pending notifications finish, then stop after the messages
    /// already queued are processed.
    pub async fn shutdown(&self) {
        self.drain_notifications().await;
        tracing::info!("🛑 Stopping OrderWriter");
        if let Err(e) = self.actor_ref.stop_gracefully().await {
            tracing::warn!(error = ?e, "OrderWriter already stopped");
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
