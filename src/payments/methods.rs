//! Payment Methods

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Payment Method Id
pub type PaymentMethodId = TypedId<PaymentMethod>;

/// A way of paying at the till (cash, card, mobile transfer, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Backend payment method id
    pub id: PaymentMethodId,

    /// Display name
    pub name: String,

    /// Whether the method may be used for new sales
    #[serde(default = "active_by_default", alias = "isActive")]
    pub is_active: bool,
}

impl PaymentMethod {
    /// Create an active payment method.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: PaymentMethodId::new(id),
            name: name.into(),
            is_active: true,
        }
    }
}

fn active_by_default() -> bool {
    true
}

/// Snapshot of the payment methods that may currently be used.
///
/// Inactive methods are dropped on construction, as are repeated ids; order
/// is preserved so "the first active method" is stable.
#[derive(Debug, Clone, Default)]
pub struct ActiveMethods {
    methods: Vec<PaymentMethod>,
    ids: FxHashSet<PaymentMethodId>,
}

impl ActiveMethods {
    /// Build a snapshot from a method listing.
    pub fn new(methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        methods.into_iter().collect()
    }

    /// First active method in listing order.
    pub fn first(&self) -> Option<&PaymentMethod> {
        self.methods.first()
    }

    /// Look up an active method by id.
    pub fn get(&self, id: PaymentMethodId) -> Option<&PaymentMethod> {
        if !self.contains(id) {
            return None;
        }

        self.methods.iter().find(|method| method.id == id)
    }

    /// Whether `id` is active.
    pub fn contains(&self, id: PaymentMethodId) -> bool {
        self.ids.contains(&id)
    }

    /// Iterate active methods in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.iter()
    }

    /// Number of active methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no method is active.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl FromIterator<PaymentMethod> for ActiveMethods {
    fn from_iter<I: IntoIterator<Item = PaymentMethod>>(iter: I) -> Self {
        let mut active = ActiveMethods::default();

        for method in iter {
            if method.is_active && active.ids.insert(method.id) {
                active.methods.push(method);
            }
        }

        active
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn drops_inactive_and_repeated_methods() {
        let mut retired = PaymentMethod::new(2, "Cheque");
        retired.is_active = false;

        let active = ActiveMethods::new([
            PaymentMethod::new(1, "Cash"),
            retired,
            PaymentMethod::new(3, "Card"),
            PaymentMethod::new(1, "Cash again"),
        ]);

        let names: Vec<_> = active.iter().map(|method| method.name.as_str()).collect();

        assert_eq!(names, ["Cash", "Card"]);
        assert!(!active.contains(PaymentMethodId::new(2)));
        assert_eq!(active.first().map(|m| m.id), Some(PaymentMethodId::new(1)));
    }

    #[test]
    fn deserializes_camel_case_flag_and_defaults_to_active() -> TestResult {
        let listed: Vec<PaymentMethod> = serde_norway::from_str(
            "- { id: 1, name: Cash }\n- { id: 2, name: Telebirr, isActive: false }\n",
        )?;

        assert_eq!(listed.len(), 2);
        assert!(listed.first().is_some_and(|method| method.is_active));
        assert!(listed.get(1).is_some_and(|method| !method.is_active));

        Ok(())
    }
}
