use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::domain::menu::{Category, Cuisine, ItemId, MealRole, MealTime, MenuItem};
use crate::errors::DomainError;

const DEFAULT_POPULARITY: f64 = 0.5;

/// Read-only menu with O(1) id lookup. Iteration follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    index: HashMap<ItemId, usize>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            validate_item(item)?;
            if index.insert(item.id.clone(), position).is_some() {
                return Err(DomainError::DuplicateItemId(item.id.clone()));
            }
        }
        Ok(Self { items, index })
    }

    /// The built-in platform menu.
    pub fn standard() -> Self {
        let items = standard_items();
        let index = items.iter().enumerate().map(|(pos, item)| (item.id.clone(), pos)).collect();
        Self { items, index }
    }

    pub fn find(&self, item_id: &ItemId) -> Option<&MenuItem> {
        self.index.get(item_id).map(|position| &self.items[*position])
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.index.contains_key(item_id)
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter().map(|item| &item.id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let veg_items = self.items.iter().filter(|item| item.is_veg).count();
        CatalogStats {
            items: self.items.len(),
            veg_items,
            non_veg_items: self.items.len() - veg_items,
            categories: self.items.iter().map(|item| item.category).collect(),
            cuisines: self.items.iter().map(|item| item.cuisine).collect(),
        }
    }
}

fn validate_item(item: &MenuItem) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidMenuItem {
        item: item.id.clone(),
        reason: reason.to_string(),
    };
    if !(0.0..=1.0).contains(&item.popularity_score) {
        return Err(invalid("popularity_score must lie in [0, 1]"));
    }
    if item.price <= Decimal::ZERO {
        return Err(invalid("price must be positive"));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CatalogStats {
    pub items: usize,
    pub veg_items: usize,
    pub non_veg_items: usize,
    pub categories: BTreeSet<Category>,
    pub cuisines: BTreeSet<Cuisine>,
}

struct ItemRow {
    id: &'static str,
    name: &'static str,
    category: Category,
    cuisine: Cuisine,
    is_veg: bool,
    price: i64,
    role: MealRole,
    times: &'static [MealTime],
    description: &'static str,
    popularity: Option<f64>,
}

impl From<ItemRow> for MenuItem {
    fn from(row: ItemRow) -> Self {
        MenuItem {
            id: ItemId::new(row.id),
            name: row.name.to_string(),
            category: row.category,
            cuisine: row.cuisine,
            is_veg: row.is_veg,
            price: Decimal::from(row.price),
            meal_role: row.role,
            meal_times: row.times.to_vec(),
            description: row.description.to_string(),
            popularity_score: row.popularity.unwrap_or(DEFAULT_POPULARITY),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn row(
    id: &'static str,
    name: &'static str,
    category: Category,
    cuisine: Cuisine,
    is_veg: bool,
    price: i64,
    role: MealRole,
    times: &'static [MealTime],
    description: &'static str,
    popularity: Option<f64>,
) -> ItemRow {
    ItemRow { id, name, category, cuisine, is_veg, price, role, times, description, popularity }
}

fn standard_items() -> Vec<MenuItem> {
    use Category::*;
    use Cuisine::*;
    use MealRole::*;
    use MealTime::*;

    const LUNCH_DINNER: &[MealTime] = &[Lunch, Dinner];

    vec![
        // Mughlai / north indian mains
        row("ITEM_001", "Chicken Biryani", Main, Mughlai, false, 299, Anchor, LUNCH_DINNER,
            "Fragrant basmati rice layered with spiced chicken, slow-cooked dum style", None),
        row("ITEM_002", "Mutton Biryani", Main, Mughlai, false, 399, Anchor, LUNCH_DINNER,
            "Rich mutton biryani with saffron-infused rice and whole spices", Some(0.45)),
        row("ITEM_003", "Veg Biryani", Main, Mughlai, true, 229, Anchor, LUNCH_DINNER,
            "Mixed vegetable biryani with paneer and aromatic spices", Some(0.55)),
        row("ITEM_004", "Butter Chicken", Main, NorthIndian, false, 279, Anchor, LUNCH_DINNER,
            "Creamy tomato-based curry with tender tandoori chicken pieces", None),
        row("ITEM_005", "Paneer Butter Masala", Main, NorthIndian, true, 249, Anchor, LUNCH_DINNER,
            "Rich and creamy paneer curry in buttery tomato gravy", Some(0.6)),
        row("ITEM_006", "Dal Makhani", Main, NorthIndian, true, 199, Anchor, LUNCH_DINNER,
            "Slow-cooked black lentils in creamy buttery sauce", Some(0.65)),
        row("ITEM_007", "Chicken Tikka Masala", Main, NorthIndian, false, 289, Anchor, LUNCH_DINNER,
            "Grilled chicken tikka in spiced onion-tomato masala", None),
        row("ITEM_008", "Chole Bhature", Main, NorthIndian, true, 179, Anchor, &[Breakfast, Lunch],
            "Spicy chickpea curry with deep-fried puffed bread", Some(0.6)),
        // South indian mains
        row("ITEM_009", "Masala Dosa", Main, SouthIndian, true, 149, Anchor, &[Breakfast, Lunch, Snacks],
            "Crispy rice crepe filled with spiced potato masala", Some(0.7)),
        row("ITEM_010", "Idli Sambar", Main, SouthIndian, true, 99, Anchor, &[Breakfast],
            "Steamed rice cakes served with lentil sambar and chutneys", Some(0.65)),
        row("ITEM_011", "Hyderabadi Dum Biryani", Main, Mughlai, false, 349, Anchor, LUNCH_DINNER,
            "Authentic Hyderabadi-style dum biryani with tender meat and fried onions", Some(0.55)),
        row("ITEM_012", "Medu Vada", Main, SouthIndian, true, 89, Anchor, &[Breakfast, Snacks],
            "Crispy lentil fritters served with sambar and coconut chutney", Some(0.5)),
        row("ITEM_013", "Uttapam", Main, SouthIndian, true, 129, Anchor, &[Breakfast, Lunch],
            "Thick rice pancake topped with onions, tomatoes, and chilies", Some(0.4)),
        // Indo-chinese mains
        row("ITEM_014", "Chicken Fried Rice", Main, Chinese, false, 199, Anchor, &[Lunch, Dinner, LateNight],
            "Wok-tossed rice with chicken, egg, and vegetables", None),
        row("ITEM_015", "Veg Hakka Noodles", Main, Chinese, true, 169, Anchor, &[Lunch, Dinner, LateNight],
            "Stir-fried noodles with mixed vegetables in soy sauce", Some(0.55)),
        row("ITEM_016", "Chicken Manchurian", Main, Chinese, false, 219, Anchor, LUNCH_DINNER,
            "Deep-fried chicken in tangy Manchurian sauce with bell peppers", None),
        row("ITEM_017", "Paneer Chilli", Main, Chinese, true, 209, Anchor, LUNCH_DINNER,
            "Crispy paneer tossed in spicy chilli garlic sauce", Some(0.5)),
        // Street food
        row("ITEM_018", "Pav Bhaji", Main, StreetFood, true, 149, Anchor, &[Lunch, Snacks, Dinner],
            "Spiced mashed vegetable curry with buttered bread rolls", Some(0.65)),
        row("ITEM_019", "Vada Pav", Main, StreetFood, true, 59, Anchor, &[Breakfast, Lunch, Snacks],
            "Mumbai's iconic spiced potato fritter in a bun", Some(0.7)),
        row("ITEM_020", "Pani Puri", Starter, StreetFood, true, 79, Addon, &[Snacks],
            "Crispy hollow puris filled with spiced water and potato", Some(0.6)),
        // Continental
        row("ITEM_021", "Margherita Pizza", Main, Continental, true, 249, Anchor, &[Lunch, Dinner, LateNight],
            "Classic pizza with fresh mozzarella and basil on tomato sauce", Some(0.55)),
        row("ITEM_022", "Chicken Burger", Main, Continental, false, 179, Anchor, &[Lunch, Dinner, LateNight],
            "Grilled chicken patty with lettuce, cheese, and mayo in a sesame bun", None),
        row("ITEM_023", "Veg Pasta", Main, Continental, true, 199, Anchor, LUNCH_DINNER,
            "Penne in creamy white sauce with mushrooms and broccoli", Some(0.45)),
        // Sides
        row("ITEM_030", "Garlic Naan", Side, NorthIndian, true, 59, Complement, LUNCH_DINNER,
            "Soft tandoor-baked bread with roasted garlic butter", Some(0.75)),
        row("ITEM_031", "Butter Naan", Side, NorthIndian, true, 49, Complement, LUNCH_DINNER,
            "Fluffy naan bread brushed with melted butter", Some(0.7)),
        row("ITEM_032", "Tandoori Roti", Side, NorthIndian, true, 29, Complement, LUNCH_DINNER,
            "Whole wheat flatbread baked in clay tandoor oven", Some(0.6)),
        row("ITEM_033", "Raita", Side, NorthIndian, true, 49, Complement, LUNCH_DINNER,
            "Cool yogurt with cucumber, onion, and cumin, a classic biryani companion", Some(0.65)),
        row("ITEM_034", "Mirchi Ka Salan", Side, Mughlai, true, 99, Complement, LUNCH_DINNER,
            "Tangy peanut-sesame gravy with green chilies, served alongside biryani", Some(0.5)),
        row("ITEM_035", "Papad", Side, NorthIndian, true, 25, Addon, LUNCH_DINNER,
            "Crispy lentil wafer, roasted or fried", Some(0.6)),
        row("ITEM_036", "Green Salad", Side, Continental, true, 69, Addon, LUNCH_DINNER,
            "Fresh cucumber, tomato, onion salad with lemon dressing", Some(0.35)),
        row("ITEM_037", "French Fries", Side, Continental, true, 99, Complement, &[Lunch, Dinner, Snacks, LateNight],
            "Golden crispy potato fries with seasoning", Some(0.65)),
        row("ITEM_038", "Coconut Chutney", Side, SouthIndian, true, 29, Complement, &[Breakfast, Lunch, Snacks],
            "Fresh ground coconut chutney with tempered mustard seeds", Some(0.55)),
        row("ITEM_039", "Sambar", Side, SouthIndian, true, 49, Complement, &[Breakfast, Lunch],
            "Tangy lentil stew with drumstick, tomato, and tamarind", Some(0.6)),
        // Starters
        row("ITEM_040", "Chicken Tikka", Starter, NorthIndian, false, 199, Addon, LUNCH_DINNER,
            "Smoky chargrilled chicken marinated in yogurt and spices", Some(0.55)),
        row("ITEM_041", "Paneer Tikka", Starter, NorthIndian, true, 189, Addon, LUNCH_DINNER,
            "Grilled cottage cheese cubes with bell peppers in tandoori marinade", Some(0.5)),
        row("ITEM_042", "Chicken Wings", Starter, Continental, false, 229, Addon, &[Dinner, LateNight],
            "Crispy fried chicken wings tossed in hot sauce", Some(0.45)),
        row("ITEM_043", "Spring Rolls", Starter, Chinese, true, 149, Addon, &[Lunch, Dinner, Snacks],
            "Crispy rolls stuffed with mixed vegetables and glass noodles", Some(0.45)),
        row("ITEM_044", "Manchow Soup", Starter, Chinese, true, 119, Addon, LUNCH_DINNER,
            "Spicy vegetable soup topped with crispy fried noodles", Some(0.4)),
        row("ITEM_045", "Tomato Soup", Starter, Continental, true, 99, Addon, LUNCH_DINNER,
            "Classic creamy tomato soup with croutons and herbs", Some(0.35)),
        // Desserts
        row("ITEM_050", "Gulab Jamun", Dessert, NorthIndian, true, 89, Finisher, LUNCH_DINNER,
            "Soft milk-solid dumplings soaked in rose-cardamom syrup", Some(0.65)),
        row("ITEM_051", "Rasmalai", Dessert, NorthIndian, true, 109, Finisher, LUNCH_DINNER,
            "Flattened paneer discs soaked in sweetened saffron milk", Some(0.5)),
        row("ITEM_052", "Kheer", Dessert, NorthIndian, true, 79, Finisher, LUNCH_DINNER,
            "Creamy rice pudding with cardamom, nuts, and saffron", Some(0.45)),
        row("ITEM_053", "Brownie with Ice Cream", Dessert, Continental, true, 149, Finisher, &[Lunch, Dinner, LateNight],
            "Warm chocolate brownie topped with vanilla ice cream", Some(0.5)),
        row("ITEM_054", "Kulfi", Dessert, NorthIndian, true, 69, Finisher, &[Lunch, Dinner, Snacks],
            "Traditional Indian ice cream with pistachio and cardamom", Some(0.55)),
        row("ITEM_055", "Payasam", Dessert, SouthIndian, true, 79, Finisher, LUNCH_DINNER,
            "South Indian milk pudding with vermicelli, cashews, and raisins", Some(0.4)),
        // Drinks
        row("ITEM_060", "Masala Chai", Drink, NorthIndian, true, 39, Finisher, &[Breakfast, Snacks],
            "Strong spiced tea with ginger and cardamom", Some(0.7)),
        row("ITEM_061", "Cold Coffee", Drink, Continental, true, 99, Finisher, &[Lunch, Snacks, LateNight],
            "Blended iced coffee with milk and chocolate drizzle", Some(0.5)),
        row("ITEM_062", "Mango Lassi", Drink, NorthIndian, true, 79, Finisher, LUNCH_DINNER,
            "Creamy yogurt smoothie with Alphonso mango pulp", Some(0.55)),
        row("ITEM_063", "Buttermilk (Chaas)", Drink, NorthIndian, true, 39, Finisher, LUNCH_DINNER,
            "Spiced salted buttermilk with cumin and mint", Some(0.6)),
        row("ITEM_064", "Thumbs Up / Cola", Drink, Continental, true, 40, Finisher, &[Lunch, Dinner, LateNight],
            "Chilled cola, the classic meal companion", Some(0.65)),
        row("ITEM_065", "Fresh Lime Soda", Drink, Continental, true, 59, Finisher, &[Lunch, Dinner, Snacks],
            "Refreshing lime soda, sweet or salted", Some(0.5)),
        row("ITEM_066", "Filter Coffee", Drink, SouthIndian, true, 49, Finisher, &[Breakfast, Snacks],
            "Traditional South Indian filter-drip coffee with frothy milk", Some(0.6)),
        row("ITEM_067", "Jaljeera", Drink, NorthIndian, true, 49, Finisher, LUNCH_DINNER,
            "Tangy cumin-mint cooler, a traditional digestive drink", Some(0.4)),
        row("ITEM_068", "Water Bottle", Drink, Continental, true, 20, Finisher, &[Breakfast, Lunch, Dinner, Snacks, LateNight],
            "Packaged drinking water 500ml", Some(0.3)),
        // Extras
        row("ITEM_070", "Extra Gravy", Side, NorthIndian, true, 49, Addon, LUNCH_DINNER,
            "Extra portion of rich curry gravy", Some(0.3)),
        row("ITEM_071", "Egg (Boiled/Fried)", Side, Continental, false, 25, Addon, &[Breakfast, Lunch, Dinner],
            "Boiled or fried egg as a quick protein add-on", Some(0.35)),
        row("ITEM_072", "Pickle (Achar)", Side, NorthIndian, true, 19, Addon, LUNCH_DINNER,
            "Spicy mango or mixed pickle", Some(0.3)),
        row("ITEM_073", "Curd (Dahi)", Side, NorthIndian, true, 35, Addon, LUNCH_DINNER,
            "Fresh plain yogurt, a cooling accompaniment for spicy meals", Some(0.45)),
    ]
    .into_iter()
    .map(MenuItem::from)
    .collect()
}
