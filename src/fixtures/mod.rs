//! Fixtures
//!
//! Named YAML fixture sets of promotions, carts, evaluation contexts and order
//! ledgers, laid out as `<base>/<category>/<name>.yml`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine},
    context::EvaluationContext,
    promotions::{Promotion, PromotionCatalog, PromotionRecord},
    segments::ledger::InMemoryLedger,
    uuids::CustomerUuid,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Cart fixture failed validation
    #[error("Invalid cart: {0}")]
    Cart(#[from] CartError),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// No cart loaded
    #[error("No cart loaded")]
    NoCart,

    /// No ledger loaded
    #[error("No ledger loaded")]
    NoLedger,
}

/// Promotions fixture file, keyed by a fixture-local name
#[derive(Debug, Deserialize)]
struct PromotionsFixture {
    promotions: BTreeMap<String, PromotionRecord>,
}

/// Cart fixture file
#[derive(Debug, Deserialize)]
struct CartFixture {
    #[serde(default)]
    customer_id: Option<CustomerUuid>,

    #[serde(default)]
    lines: Vec<CartLine>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded promotions, in key order
    promotions: Vec<Promotion>,

    /// String key -> index into `promotions`
    promotion_keys: BTreeMap<String, usize>,

    cart: Option<Cart>,

    context: EvaluationContext,

    ledger: Option<InMemoryLedger>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            promotions: Vec::new(),
            promotion_keys: BTreeMap::new(),
            cart: None,
            context: EvaluationContext::default(),
            ledger: None,
        }
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Load promotions from a YAML fixture file
    ///
    /// Promotions with unusable strategy parameters load as inert, exactly as
    /// a pricing pass would see them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: PromotionsFixture = self.read("promotions", name)?;

        for (key, record) in fixture.promotions {
            self.promotion_keys.insert(key, self.promotions.len());
            self.promotions.push(record.into_promotion());
        }

        Ok(self)
    }

    /// Load the cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails cart validation.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = self.read("carts", name)?;

        self.cart = Some(Cart::with_lines(fixture.lines, fixture.customer_id)?);

        Ok(self)
    }

    /// Load the evaluation context from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_context(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.context = self.read("contexts", name)?;

        Ok(self)
    }

    /// Load the order ledger from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_ledger(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.ledger = Some(self.read("ledgers", name)?);

        Ok(self)
    }

    /// Load a complete fixture set (promotions, cart and context with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_promotions(name)?
            .load_cart(name)?
            .load_context(name)?;

        Ok(fixture)
    }

    /// Return the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get a promotion by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, key: &str) -> Result<&Promotion, FixtureError> {
        self.promotion_keys
            .get(key)
            .and_then(|index| self.promotions.get(*index))
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get all promotions
    pub fn promotions(&self) -> &[Promotion] {
        &self.promotions
    }

    /// Build a catalog of the loaded promotions
    pub fn catalog(&self) -> PromotionCatalog {
        self.promotions.iter().cloned().collect()
    }

    /// Get the loaded cart
    ///
    /// # Errors
    ///
    /// Returns an error if no cart has been loaded.
    pub fn cart(&self) -> Result<&Cart, FixtureError> {
        self.cart.as_ref().ok_or(FixtureError::NoCart)
    }

    /// Get the evaluation context; empty unless one has been loaded
    pub const fn context(&self) -> &EvaluationContext {
        &self.context
    }

    /// Get the loaded ledger
    ///
    /// # Errors
    ///
    /// Returns an error if no ledger has been loaded.
    pub fn ledger(&self) -> Result<&InMemoryLedger, FixtureError> {
        self.ledger.as_ref().ok_or(FixtureError::NoLedger)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
