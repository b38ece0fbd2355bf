//! Checkout form input and validation.

use std::fmt;

use thiserror::Error;

/// Shipping details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    /// Recipient's full name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Contact phone number
    pub phone: String,

    /// Street address
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code, digits only
    pub postal_code: String,

    /// Country
    pub country: String,
}

impl ShippingDetails {
    /// Join the non-empty address parts into one line, e.g. `"12 Rose Lane, Pune, MH, India"`.
    pub fn address_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.country]
            .into_iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Card details for card payments.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CardDetails {
    /// Card number
    pub number: String,

    /// Expiry date as entered, e.g. `"08/29"`
    pub expiry: String,

    /// Security code
    pub cvv: String,

    /// Name on the card
    pub holder: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("holder", &self.holder)
            .finish_non_exhaustive()
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Credit or debit card
    Card(CardDetails),

    /// `PayPal`
    PayPal,

    /// Apple Pay
    ApplePay,

    /// Other online payment
    Online,

    /// Cash on delivery
    CashOnDelivery,
}

impl PaymentMethod {
    /// Code sent to the order service.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Card(_) => "card",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::ApplePay => "apple_pay",
            PaymentMethod::Online => "online",
            PaymentMethod::CashOnDelivery => "cod",
        }
    }
}

/// Everything the shopper enters at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Where to ship
    pub shipping: ShippingDetails,

    /// How to pay
    pub payment: PaymentMethod,
}

/// Checkout field that must not be blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    /// Recipient name
    Name,

    /// Contact email
    Email,

    /// Street address
    Street,

    /// City
    City,

    /// Postal code
    PostalCode,

    /// Card number
    CardNumber,

    /// Card expiry date
    CardExpiry,

    /// Card security code
    CardCvv,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequiredField::Name => "name",
            RequiredField::Email => "email",
            RequiredField::Street => "street address",
            RequiredField::City => "city",
            RequiredField::PostalCode => "postal code",
            RequiredField::CardNumber => "card number",
            RequiredField::CardExpiry => "expiry date",
            RequiredField::CardCvv => "CVV",
        })
    }
}

/// Reasons a checkout form is refused before anything is sent.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A shipping field is blank.
    #[error("Please fill in all shipping information ({0} is missing)")]
    MissingShippingField(RequiredField),

    /// The postal code is not a number.
    #[error("Please enter a numeric postal code")]
    InvalidPostalCode,

    /// A card field is blank.
    #[error("Please fill in all payment information ({0} is missing)")]
    MissingPaymentDetails(RequiredField),

    /// There is nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,
}

impl CheckoutForm {
    /// Check the form, returning the postal code as the order service expects it.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, shipping fields first.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        let shipping = &self.shipping;

        for (field, value) in [
            (RequiredField::Name, &shipping.name),
            (RequiredField::Email, &shipping.email),
            (RequiredField::Street, &shipping.street),
            (RequiredField::City, &shipping.city),
            (RequiredField::PostalCode, &shipping.postal_code),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingShippingField(field));
            }
        }

        let pincode = shipping
            .postal_code
            .trim()
            .parse::<u32>()
            .map_err(|_parse| ValidationError::InvalidPostalCode)?;

        if let PaymentMethod::Card(card) = &self.payment {
            for (field, value) in [
                (RequiredField::CardNumber, &card.number),
                (RequiredField::CardExpiry, &card.expiry),
                (RequiredField::CardCvv, &card.cvv),
            ] {
                if value.trim().is_empty() {
                    return Err(ValidationError::MissingPaymentDetails(field));
                }
            }
        }

        Ok(pincode)
    }
}
