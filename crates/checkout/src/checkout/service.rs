//! Checkout orchestrator.

use std::{fmt, sync::Arc, time::Duration};

use aura::{cart::Cart, products::ProductId};
use rust_decimal::Decimal;
use smallvec::SmallVec;
use tokio::sync::{Mutex, watch};
use tracing::info;

use crate::{
    checkout::{
        errors::{CheckoutError, SubmissionError},
        form::{CheckoutForm, ValidationError},
        state::CheckoutState,
    },
    geolocation::{Coordinates, GeolocationProvider, locate_or_default},
    identity::{IdentityResolver, resolve_user_id},
    money::to_major,
    orders::{OrderLineRequest, OrderRequest, OrdersApi},
};

/// Cart shared between the storefront and checkout.
pub type SharedCart = Arc<Mutex<Cart>>;

/// Upper bounds on the slow steps of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTimeouts {
    /// Wait for the order service
    pub submit: Duration,

    /// Wait for a device position
    pub geolocation: Duration,
}

impl Default for CheckoutTimeouts {
    fn default() -> Self {
        Self {
            submit: Duration::from_secs(10),
            geolocation: Duration::from_secs(5),
        }
    }
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Acknowledgement text from the order service
    pub acknowledgement: String,

    /// The request that was sent
    pub request: OrderRequest,

    /// Position sent with the order
    pub position: Coordinates,
}

struct CartSnapshot {
    lines: SmallVec<[(ProductId, u32); 8]>,
    price: Decimal,
}

/// Runs checkout attempts against a shared cart, one at a time.
pub struct CheckoutOrchestrator {
    cart: SharedCart,
    identity: Arc<dyn IdentityResolver>,
    geolocation: Arc<dyn GeolocationProvider>,
    orders: Arc<dyn OrdersApi>,
    timeouts: CheckoutTimeouts,
    state: watch::Sender<CheckoutState>,
}

impl fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("timeouts", &self.timeouts)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    /// Create an orchestrator in the [`CheckoutState::Idle`] state.
    #[must_use]
    pub fn new(
        cart: SharedCart,
        identity: Arc<dyn IdentityResolver>,
        geolocation: Arc<dyn GeolocationProvider>,
        orders: Arc<dyn OrdersApi>,
        timeouts: CheckoutTimeouts,
    ) -> Self {
        Self {
            cart,
            identity,
            geolocation,
            orders,
            timeouts,
            state: watch::Sender::new(CheckoutState::Idle),
        }
    }

    /// The cart this orchestrator checks out.
    pub fn cart(&self) -> &SharedCart {
        &self.cart
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        self.state.borrow().clone()
    }

    /// Return to [`CheckoutState::Idle`] after a finished attempt.
    ///
    /// Does nothing while an attempt is in flight; returns whether the state changed.
    pub fn reset(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_busy() || *state == CheckoutState::Idle {
                return false;
            }

            *state = CheckoutState::Idle;

            true
        })
    }

    /// Validate the form and cart, then place the order.
    ///
    /// On success the cart is emptied. On failure the cart is left as it was and the attempt may
    /// be repeated.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InProgress`] if another attempt is in flight
    /// - [`CheckoutError::AuthRequired`] or [`CheckoutError::Validation`] if the attempt is
    ///   refused before anything is sent
    /// - [`CheckoutError::IdentityResolution`] or [`CheckoutError::Submission`] if sending fails
    pub async fn submit(&self, form: &CheckoutForm) -> Result<OrderConfirmation, CheckoutError> {
        let Some(mut in_flight) = InFlight::begin(&self.state) else {
            info!("checkout already in progress");

            return Err(CheckoutError::InProgress);
        };

        let result = self.run(form).await;

        let next = match &result {
            Ok(confirmation) => {
                info!(
                    user_id = %confirmation.request.user_id,
                    lines = confirmation.request.products.len(),
                    price = %confirmation.request.price,
                    "order placed"
                );

                CheckoutState::Succeeded {
                    acknowledgement: confirmation.acknowledgement.clone(),
                }
            }
            Err(error) if error.is_rejection() => CheckoutState::Rejected(error.user_message()),
            Err(error) => CheckoutState::Failed(error.user_message()),
        };

        in_flight.finish(next);

        result
    }

    async fn run(&self, form: &CheckoutForm) -> Result<OrderConfirmation, CheckoutError> {
        if !self.identity.is_authenticated().await {
            return Err(CheckoutError::AuthRequired);
        }

        let pincode = form.validate()?;
        let snapshot = self.snapshot().await?;

        transition(&self.state, CheckoutState::Submitting);

        let user_id = resolve_user_id(self.identity.as_ref())
            .await
            .ok_or(CheckoutError::IdentityResolution)?;

        let position = locate_or_default(self.geolocation.as_ref(), self.timeouts.geolocation).await;

        let request = OrderRequest {
            user_id,
            products: snapshot
                .lines
                .into_iter()
                .map(|(product_id, quantity)| OrderLineRequest {
                    product_id,
                    quantity,
                })
                .collect(),
            address: form.shipping.address_line(),
            pincode,
            price: snapshot.price,
            phone: form.shipping.phone.trim().to_string(),
            payment_method: form.payment.code().to_string(),
        };

        let acknowledgement = tokio::time::timeout(
            self.timeouts.submit,
            self.orders.place_order(&request, position),
        )
        .await
        .map_err(|_elapsed| SubmissionError::Timeout(self.timeouts.submit))?
        .map_err(SubmissionError::from)?;

        {
            let mut cart = self.cart.lock().await;

            cart.clear();
            cart.remove_promo_code();
        }

        Ok(OrderConfirmation {
            acknowledgement,
            request,
            position,
        })
    }

    async fn snapshot(&self) -> Result<CartSnapshot, CheckoutError> {
        let cart = self.cart.lock().await;

        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let lines = cart
            .lines()
            .iter()
            .map(|line| (line.product_id().clone(), line.quantity()))
            .collect();

        let price = to_major(&cart.total()?);

        Ok(CartSnapshot { lines, price })
    }
}

fn transition(state: &watch::Sender<CheckoutState>, next: CheckoutState) {
    info!(state = ?next, "checkout state changed");

    state.send_replace(next);
}

/// Marks an attempt as in flight. If the attempt is dropped before finishing, the state moves
/// to [`CheckoutState::Failed`] so later attempts are not locked out.
struct InFlight<'a> {
    state: &'a watch::Sender<CheckoutState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a watch::Sender<CheckoutState>) -> Option<Self> {
        let started = state.send_if_modified(|current| {
            if current.is_busy() {
                return false;
            }

            *current = CheckoutState::Validating;

            true
        });

        if !started {
            return None;
        }

        info!(state = ?CheckoutState::Validating, "checkout state changed");

        Some(Self {
            state,
            finished: false,
        })
    }

    fn finish(&mut self, next: CheckoutState) {
        self.finished = true;

        transition(self.state, next);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            transition(
                self.state,
                CheckoutState::Failed("Checkout was interrupted".to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use aura::products::Product;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        checkout::form::{PaymentMethod, ShippingDetails},
        geolocation::{MockGeolocationProvider, NoGeolocation},
        identity::{MockIdentityResolver, StaticIdentity},
        orders::{MockOrdersApi, OrdersApiError},
    };

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            shipping: ShippingDetails {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
                street: "12 Rose Lane".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                postal_code: "411001".to_string(),
                country: "India".to_string(),
            },
            payment: PaymentMethod::CashOnDelivery,
        }
    }

    fn stocked_cart() -> TestResult<SharedCart> {
        let mut cart = Cart::new(USD);
        cart.add_item(
            &Product::new("lip-01", "Velvet Lipstick", Money::from_minor(25_00, USD)),
            2,
        )?;

        Ok(Arc::new(Mutex::new(cart)))
    }

    fn orchestrator(
        cart: SharedCart,
        identity: impl IdentityResolver + 'static,
        orders: MockOrdersApi,
    ) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            cart,
            Arc::new(identity),
            Arc::new(NoGeolocation),
            Arc::new(orders),
            CheckoutTimeouts::default(),
        )
    }

    #[tokio::test]
    async fn submit_places_order_and_clears_cart() -> TestResult {
        let cart = stocked_cart()?;

        let mut orders = MockOrdersApi::new();
        orders
            .expect_place_order()
            .withf(|request, position| {
                request.price == Decimal::new(50_00, 2)
                    && request.pincode == 411_001
                    && request.payment_method == "cod"
                    && *position == Coordinates::default()
            })
            .times(1)
            .returning(|_, _| Ok("your order is placed".to_string()));

        let checkout = orchestrator(cart.clone(), StaticIdentity::signed_in("u-1"), orders);

        let confirmation = checkout.submit(&form()).await?;

        assert_eq!(confirmation.acknowledgement, "your order is placed");
        assert_eq!(confirmation.request.address, "12 Rose Lane, Pune, MH, India");
        assert!(cart.lock().await.is_empty());
        assert_eq!(
            checkout.state(),
            CheckoutState::Succeeded {
                acknowledgement: "your order is placed".to_string()
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn busy_orchestrator_refuses_second_attempt() -> TestResult {
        let mut orders = MockOrdersApi::new();
        orders.expect_place_order().never();

        let checkout = orchestrator(stocked_cart()?, StaticIdentity::signed_in("u-1"), orders);
        checkout.state.send_replace(CheckoutState::Submitting);

        let result = checkout.submit(&form()).await;

        assert!(matches!(result, Err(CheckoutError::InProgress)));
        assert_eq!(checkout.state(), CheckoutState::Submitting);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let mut orders = MockOrdersApi::new();
        orders.expect_place_order().never();

        let checkout = orchestrator(
            Arc::new(Mutex::new(Cart::new(USD))),
            StaticIdentity::signed_in("u-1"),
            orders,
        );

        let result = checkout.submit(&form()).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ValidationError::EmptyCart))
        ));
        assert_eq!(
            checkout.state(),
            CheckoutState::Rejected("Your cart is empty".to_string())
        );
    }

    #[tokio::test]
    async fn missing_user_id_fails_without_sending() -> TestResult {
        let mut identity = MockIdentityResolver::new();
        identity.expect_is_authenticated().returning(|| true);
        identity.expect_token_user_id().returning(|| None);
        identity.expect_cached_user_id().returning(|| None);

        let mut orders = MockOrdersApi::new();
        orders.expect_place_order().never();

        let cart = stocked_cart()?;
        let checkout = orchestrator(cart.clone(), identity, orders);

        let result = checkout.submit(&form()).await;

        assert!(matches!(result, Err(CheckoutError::IdentityResolution)));
        assert!(matches!(checkout.state(), CheckoutState::Failed(_)));
        assert_eq!(cart.lock().await.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn geolocation_position_is_sent() -> TestResult {
        let mut geolocation = MockGeolocationProvider::new();
        geolocation
            .expect_current_position()
            .returning(|| Ok(Coordinates::new(18.52, 73.85)));

        let mut orders = MockOrdersApi::new();
        orders
            .expect_place_order()
            .withf(|_, position| *position == Coordinates::new(18.52, 73.85))
            .returning(|_, _| Ok("ok".to_string()));

        let checkout = CheckoutOrchestrator::new(
            stocked_cart()?,
            Arc::new(StaticIdentity::signed_in("u-1")),
            Arc::new(geolocation),
            Arc::new(orders),
            CheckoutTimeouts::default(),
        );

        let confirmation = checkout.submit(&form()).await?;

        assert_eq!(confirmation.position, Coordinates::new(18.52, 73.85));

        Ok(())
    }

    #[tokio::test]
    async fn failure_can_be_retried() -> TestResult {
        let mut orders = MockOrdersApi::new();
        let mut seq = mockall::Sequence::new();
        orders
            .expect_place_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(OrdersApiError::UnexpectedResponse {
                    status: 502,
                    body: String::new(),
                })
            });
        orders
            .expect_place_order()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("placed".to_string()));

        let cart = stocked_cart()?;
        let checkout = orchestrator(cart.clone(), StaticIdentity::signed_in("u-1"), orders);

        assert!(checkout.submit(&form()).await.is_err());
        assert_eq!(
            checkout.state(),
            CheckoutState::Failed("The order service responded with status 502".to_string())
        );
        assert_eq!(cart.lock().await.count(), 2);

        checkout.submit(&form()).await?;

        assert!(cart.lock().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn reset_returns_to_idle() {
        let checkout = orchestrator(
            Arc::new(Mutex::new(Cart::new(USD))),
            StaticIdentity::anonymous(),
            MockOrdersApi::new(),
        );

        assert!(checkout.submit(&form()).await.is_err());
        assert!(checkout.reset());
        assert_eq!(checkout.state(), CheckoutState::Idle);
        assert!(!checkout.reset());
    }

    #[test]
    fn dropped_attempt_releases_busy_flag() {
        let (state, _rx) = watch::channel(CheckoutState::Idle);

        let guard = InFlight::begin(&state);
        assert!(guard.is_some(), "first attempt should start");
        assert!(InFlight::begin(&state).is_none(), "second attempt should be refused");

        drop(guard);

        assert!(matches!(*state.borrow(), CheckoutState::Failed(_)));
        assert!(InFlight::begin(&state).is_some(), "attempt after drop should start");
    }
}
