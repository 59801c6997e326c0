//! Store Identity
//!
//! Resolution of cart line items to canonical store identifiers, and the
//! store-scope matching shared by coupon validation and discount calculation.

use std::fmt;

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::carts::CartItem;

/// The fallback identifier for local items no recognized domain matched.
const LOCAL_TAG: &str = "local";

/// Raw store tag carried by a cart line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Store {
    /// A catalogued merchant tag; passes through resolution unchanged.
    Merchant(String),

    /// An uncatalogued local merchant; resolved through its product URL.
    Local,
}

impl Store {
    /// Parse a raw store tag; the literal `local` (any casing) is the
    /// uncatalogued-merchant sentinel.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let trimmed = tag.trim();

        if trimmed.eq_ignore_ascii_case(LOCAL_TAG) {
            Self::Local
        } else {
            Self::Merchant(trimmed.to_string())
        }
    }

    /// Whether this is the local sentinel.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

/// Canonical store identifier: a merchant tag, a recognized domain, or the
/// raw `local` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreId(String);

impl StoreId {
    /// Wrap a canonical identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fallback identifier for unresolved local items.
    #[must_use]
    pub fn local() -> Self {
        Self(LOCAL_TAG.to_string())
    }

    /// The identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recognized-domain settings entry.
///
/// The entry order is the match order: resolution takes the first enabled
/// domain contained in an item's product URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedDomain {
    /// Domain as configured; scheme and trailing slashes are tolerated.
    pub domain: String,

    /// Disabled entries are skipped during resolution.
    pub enabled: bool,

    /// Display name for the merchant behind the domain.
    pub name: String,
}

/// Normalize a domain or URL for matching: trimmed, lower-cased, scheme and
/// trailing slashes stripped.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);

    stripped.trim_end_matches('/').to_string()
}

/// Resolve one line item to its canonical store identifier.
///
/// Merchant tags pass through unchanged. Local items take the first enabled
/// recognized domain contained in their product URL; when no domain matches,
/// or the item has no URL, the raw `local` tag is kept.
#[must_use]
pub fn resolve(item: &CartItem, domains: &[RecognizedDomain]) -> StoreId {
    match item.store() {
        Store::Merchant(tag) => StoreId::new(tag.clone()),
        Store::Local => item
            .product_url()
            .map(normalize_domain)
            .and_then(|url| {
                domains
                    .iter()
                    .filter(|entry| entry.enabled)
                    .map(|entry| normalize_domain(&entry.domain))
                    .find(|domain| !domain.is_empty() && url.contains(domain.as_str()))
            })
            .map_or_else(StoreId::local, StoreId::new),
    }
}

/// Resolve every item in a cart in one pass, preserving item order.
#[must_use]
pub fn resolve_all(items: &[CartItem], domains: &[RecognizedDomain]) -> SmallVec<[StoreId; 8]> {
    items.iter().map(|item| resolve(item, domains)).collect()
}

/// Subtotals over the items one coupon's store restriction matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applicability {
    /// Sum of line totals over matching items.
    pub subtotal: Decimal,

    /// Matching line totals grouped by attribution key, in first-match order.
    pub by_store: SmallVec<[(StoreId, Decimal); 4]>,
}

impl Applicability {
    /// Whether at least one item matched.
    #[must_use]
    pub fn matched(&self) -> bool {
        !self.by_store.is_empty()
    }
}

/// Compute the applicable subtotal and its per-store split for one coupon's
/// store restriction.
///
/// An empty restriction covers every item, attributed to resolved
/// identifiers. A non-empty restriction covers the items matching one of its
/// entries, attributed to the entry as written.
#[must_use]
pub fn applicability(
    items: &[CartItem],
    resolved: &[StoreId],
    restriction: &[String],
) -> Applicability {
    let mut applicability = Applicability::default();

    for (item, store) in items.iter().zip(resolved) {
        let key = if restriction.is_empty() {
            Some(store.clone())
        } else {
            restriction
                .iter()
                .find(|entry| entry_matches(item, store, entry.as_str()))
                .map(|entry| StoreId::new(entry.clone()))
        };

        let Some(key) = key else { continue };

        let line_total = item.line_total();
        applicability.subtotal += line_total;

        if let Some((_, amount)) = applicability
            .by_store
            .iter_mut()
            .find(|(existing, _)| *existing == key)
        {
            *amount += line_total;
        } else {
            applicability.by_store.push((key, line_total));
        }
    }

    applicability
}

/// Whether a resolved item satisfies one restriction entry: identifier
/// equality, or a domain match against the product URL for local items.
fn entry_matches(item: &CartItem, resolved: &StoreId, entry: &str) -> bool {
    let entry = normalize_domain(entry);

    if normalize_domain(resolved.as_str()) == entry {
        return true;
    }

    !entry.is_empty()
        && item.store().is_local()
        && item
            .product_url()
            .is_some_and(|url| normalize_domain(url).contains(entry.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_domains() -> Vec<RecognizedDomain> {
        vec![
            RecognizedDomain {
                domain: "https://shop.hartley.coffee/".to_string(),
                enabled: true,
                name: "Hartley Coffee Roasters".to_string(),
            },
            RecognizedDomain {
                domain: "books.pellum.io".to_string(),
                enabled: true,
                name: "Pellum Books".to_string(),
            },
            RecognizedDomain {
                domain: "deals.orbit.store".to_string(),
                enabled: false,
                name: "Orbit Deals".to_string(),
            },
        ]
    }

    fn local_item(url: &str, price: Decimal) -> CartItem {
        CartItem::with_product_url(Store::Local, url, price, 1)
    }

    #[test]
    fn from_tag_recognizes_the_local_sentinel() {
        assert!(Store::from_tag("local").is_local(), "lower case");
        assert!(Store::from_tag(" LOCAL ").is_local(), "upper case, padded");
        assert!(
            !Store::from_tag("localmart").is_local(),
            "merchant tags containing 'local' are not the sentinel"
        );
    }

    #[test]
    fn normalize_strips_scheme_case_and_trailing_slash() {
        assert_eq!(
            normalize_domain("https://Shop.Hartley.Coffee/"),
            "shop.hartley.coffee"
        );
        assert_eq!(normalize_domain("http://books.pellum.io"), "books.pellum.io");
        assert_eq!(normalize_domain("  deals.orbit.store//  "), "deals.orbit.store");
    }

    #[test]
    fn merchant_tags_pass_through_unchanged() {
        let item = CartItem::new(Store::from_tag("brightmart"), Decimal::from(10), 1);

        assert_eq!(resolve(&item, &test_domains()), StoreId::new("brightmart"));
    }

    #[test]
    fn local_item_takes_first_enabled_matching_domain() {
        let item = local_item(
            "https://SHOP.hartley.coffee/beans/ethiopia-natural",
            Decimal::from(10),
        );

        assert_eq!(
            resolve(&item, &test_domains()),
            StoreId::new("shop.hartley.coffee")
        );
    }

    #[test]
    fn disabled_domains_are_skipped() {
        let item = local_item("https://deals.orbit.store/clearance", Decimal::from(10));

        assert_eq!(resolve(&item, &test_domains()), StoreId::local());
    }

    #[test]
    fn local_item_without_url_keeps_local_tag() {
        let item = CartItem::new(Store::Local, Decimal::from(10), 1);

        assert_eq!(resolve(&item, &test_domains()), StoreId::local());
    }

    #[test]
    fn empty_restriction_covers_every_item() {
        let items = vec![
            CartItem::new(Store::from_tag("brightmart"), Decimal::from(60), 1),
            local_item("https://books.pellum.io/fiction", Decimal::from(40)),
        ];
        let resolved = resolve_all(&items, &test_domains());

        let applicability = applicability(&items, &resolved, &[]);

        assert_eq!(applicability.subtotal, Decimal::from(100));
        assert_eq!(
            applicability.by_store.as_slice(),
            &[
                (StoreId::new("brightmart"), Decimal::from(60)),
                (StoreId::new("books.pellum.io"), Decimal::from(40)),
            ]
        );
    }

    #[test]
    fn restriction_matches_merchant_tags_case_insensitively() {
        let items = vec![CartItem::new(
            Store::from_tag("brightmart"),
            Decimal::from(60),
            1,
        )];
        let resolved = resolve_all(&items, &test_domains());
        let restriction = vec!["Brightmart".to_string()];

        let applicability = applicability(&items, &resolved, &restriction);

        assert_eq!(applicability.subtotal, Decimal::from(60));
        assert_eq!(
            applicability.by_store.as_slice(),
            &[(StoreId::new("Brightmart"), Decimal::from(60))],
            "attribution keeps the restriction entry as written"
        );
    }

    #[test]
    fn restriction_matches_local_items_by_url_substring() {
        let items = vec![
            local_item("https://deals.orbit.store/clearance", Decimal::from(25)),
            CartItem::new(Store::from_tag("brightmart"), Decimal::from(60), 1),
        ];
        let resolved = resolve_all(&items, &test_domains());
        let restriction = vec!["deals.orbit.store".to_string()];

        let applicability = applicability(&items, &resolved, &restriction);

        // The disabled flag only affects resolution, not restriction matching.
        assert_eq!(applicability.subtotal, Decimal::from(25));
        assert!(applicability.matched());
    }

    #[test]
    fn unmatched_restriction_yields_empty_applicability() {
        let items = vec![CartItem::new(
            Store::from_tag("brightmart"),
            Decimal::from(60),
            1,
        )];
        let resolved = resolve_all(&items, &test_domains());
        let restriction = vec!["shop.hartley.coffee".to_string()];

        let applicability = applicability(&items, &resolved, &restriction);

        assert!(!applicability.matched());
        assert_eq!(applicability.subtotal, Decimal::ZERO);
    }

    #[test]
    fn quantities_count_toward_the_applicable_subtotal() {
        let items = vec![CartItem::with_product_url(
            Store::Local,
            "https://shop.hartley.coffee/beans",
            Decimal::new(1850, 2),
            2,
        )];
        let resolved = resolve_all(&items, &test_domains());

        let applicability = applicability(&items, &resolved, &[]);

        assert_eq!(applicability.subtotal, Decimal::new(3700, 2));
    }
}
