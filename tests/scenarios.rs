//! End-to-end configurator scenarios over a small catalog.

use rust_decimal::Decimal;
use storefront_configurator::{
    Attribute, Cart, CartStore, Catalog, CategoryClass, CategoryTable, ConfiguratorEvent, DimensionKind, Engine, InMemoryStore,
    MagnitudeHeuristic, DimensionNormalizer, MergeOutcome, Money, PricingClass, QuantityClass, Resolution, Selection,
};

const CATALOG: &str = r#"[
  {
    "id": "policarbonato-alveolar", "name": "Policarbonato Alveolar", "category": "Policarbonato Alveolar",
    "variants": [
      { "sku": "PAL-4MM-CR", "name": "Alveolar 4mm Cristal", "thickness": "4mm", "color": "Cristal", "width": "2,10", "length": "5,80", "stock": 80, "price_net": 33605, "price": 39990 },
      { "sku": "PAL-6MM-CR", "name": "Alveolar 6mm Cristal", "thickness": "6mm", "color": "Cristal", "width": "2,10", "length": "5,80", "stock": 60, "price_net": 44529, "price": 52990, "uv_protection": true },
      { "sku": "PAL-6MM-BR", "name": "Alveolar 6mm Bronce", "thickness": "6mm", "color": "Bronce", "width": "1,05", "length": "2,90", "stock": 30, "price_net": 15958, "price": 18990 },
      { "sku": "PAL-6MM-BR-L", "name": "Alveolar 6mm Bronce largo", "thickness": "6mm", "color": "Bronce", "width": "1,05", "length": "5,80", "stock": 30, "price_net": 29403, "price": 34990 }
    ]
  },
  {
    "id": "policarbonato-compacto", "name": "Policarbonato Compacto", "category": "Policarbonato Compacto",
    "variants": [
      { "sku": "517-3MM-CR", "name": "Compacto 3mm Cristal", "thickness": "3mm", "color": "Cristal", "width": "2,05", "length": "3,05", "stock": 4, "price_net": 75622, "price": 89990 }
    ]
  },
  {
    "id": "lamina-rollo", "name": "Lámina en rollo", "category": "Rollos",
    "variants": [
      { "sku": "ROL-08", "name": "Rollo 0.8mm", "thickness": "0.8mm", "width": "0.81", "length": "1,33", "stock": 200, "price_net": 8403, "price": 10000 },
      { "sku": "ROL-FR", "name": "Rollo 1mm", "thickness": "1mm", "width": "2,10", "length": "5,80", "stock": 200, "price_net": 6535, "price": 7777 },
      { "sku": "ROL-SIN", "name": "Rollo sin medida", "thickness": "1mm", "stock": 200, "price_net": 8403, "price": 10000 }
    ]
  }
]"#;

fn catalog() -> Catalog {
    let table = CategoryTable::new().with("Rollos", CategoryClass { pricing: Some(PricingClass::Area), quantity: None });
    Catalog::from_json(CATALOG, &table).unwrap()
}

fn engine() -> Engine { Engine::new("CLP") }

#[test]
fn scenario_a_alveolar_resolves_and_prices_flat() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("policarbonato-alveolar").unwrap();
    let selection = Selection::default()
        .with(Attribute::Thickness, "6mm")
        .with(Attribute::Color, "Cristal")
        .with(Attribute::Width, "2,10")
        .with(Attribute::Length, "5,80");
    let variant = engine.resolve_variant(group, &selection).unwrap();
    assert_eq!(variant.sku.as_str(), "PAL-6MM-CR");
    assert_eq!(engine.compute_unit_price(variant, &group.category), Money::clp(Decimal::new(52990, 0)));
}

#[test]
fn scenario_b_compact_sheet_quantity_flow() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("policarbonato-compacto").unwrap();
    let configurator = engine.configurator(group);
    let state = configurator.mount().unwrap();
    assert_eq!(state.quantity, 1);
    let state = configurator.reduce(state, ConfiguratorEvent::Increment);
    assert_eq!(state.quantity, 2);
    let state = configurator.reduce(state, ConfiguratorEvent::Decrement);
    let state = configurator.reduce(state, ConfiguratorEvent::Decrement);
    assert!(state.removed);
    assert_eq!(state.quantity, 0);
}

#[test]
fn scenario_c_width_in_centimeters() {
    let dimension = MagnitudeHeuristic.normalize(Some("0.81"), DimensionKind::Width, "Rollos");
    assert_eq!(dimension.label, "81cm");
    assert_eq!(dimension.meters, Some(Decimal::new(81, 2)));
}

#[test]
fn scenario_d_color_change_repairs_width() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("policarbonato-alveolar").unwrap();
    let configurator = engine.configurator(group);
    let select = |attribute, value: &str| ConfiguratorEvent::Select { attribute, value: value.to_string() };

    let state = configurator.reduce(configurator.mount().unwrap(), select(Attribute::Thickness, "6mm"));
    assert_eq!(state.selection.width.as_deref(), Some("2,10"));
    let state = configurator.reduce(state, select(Attribute::Color, "Bronce"));
    assert_eq!(state.selection.width.as_deref(), Some("1,05"));
    // 5,80 still exists in Bronce, so length survives the repair.
    assert_eq!(state.selection.length.as_deref(), Some("5,80"));
    assert_eq!(state.sku.as_str(), "PAL-6MM-BR-L");
    assert_eq!(state.resolution, Resolution::Exact);
    assert_eq!(state.options.length, vec!["2,90", "5,80"]);
    let variant = group.variant(&state.sku).unwrap();
    assert!(variant.matches(&state.selection));
}

#[test]
fn area_priced_category_uses_dimensions() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("lamina-rollo").unwrap();
    let sized = &group.variants[0];
    assert_eq!(engine.compute_unit_price(sized, &group.category).amount(), Decimal::new(10773, 0));
    let fractional = &group.variants[1];
    assert_eq!(engine.compute_unit_price(fractional, &group.category).amount(), Decimal::new(9472386, 2));
    let r#unsized = &group.variants[2];
    assert_eq!(engine.compute_unit_price(r#unsized, &group.category).amount(), Decimal::new(10000, 0));
}

#[test]
fn classes_are_resolved_per_variant_at_load() {
    let catalog = catalog();
    let compact = catalog.group("policarbonato-compacto").unwrap();
    assert_eq!(compact.variants[0].class.quantity, QuantityClass::Single);
    let rollos = catalog.group("lamina-rollo").unwrap();
    assert!(rollos.variants.iter().all(|v| v.class.pricing == PricingClass::Area && v.class.quantity == QuantityClass::BulkTen));
}

#[test]
fn add_to_cart_twice_is_one_line() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("policarbonato-alveolar").unwrap();
    let variant = &group.variants[1];
    let price = engine.compute_unit_price(variant, &group.category);
    let mut cart = Cart::new("CLP");
    let dates = InMemoryStore::new();
    engine.add_to_cart(&mut cart, &dates, group, variant, 10, price.clone()).unwrap();
    engine.add_to_cart(&mut cart, &dates, group, variant, 10, price.clone()).unwrap();
    assert_eq!(cart.items().len(), 1);
    let line = &cart.items()[0];
    assert_eq!(line.quantity(), 20);
    assert_eq!(line.total(), &price.multiply(20));
}

#[test]
fn compact_stock_ceiling_refuses_increment() {
    let catalog = catalog();
    let engine = engine();
    let group = catalog.group("policarbonato-compacto").unwrap();
    let configurator = engine.configurator(group);
    let mut state = configurator.mount().unwrap();
    for _ in 0..10 { state = configurator.reduce(state, ConfiguratorEvent::Increment); }
    assert_eq!(state.quantity, 4);

    let variant = &group.variants[0];
    let mut cart = Cart::new("CLP");
    let dates = InMemoryStore::new();
    let price = engine.compute_unit_price(variant, &group.category);
    engine.add_to_cart(&mut cart, &dates, group, variant, 4, price.clone()).unwrap();
    assert_eq!(engine.add_to_cart(&mut cart, &dates, group, variant, 1, price).unwrap(), MergeOutcome::Unchanged { quantity: 4 });
}
