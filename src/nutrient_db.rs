//! Base de datos nutricional estática (valores por 100 g) y utilidades de cálculo.

use crate::models::{FoodNutrient, NutrientSummary};

/// Ración por defecto en gramos cuando no se indica otra.
pub const DEFAULT_PORTION_GRAMS: f64 = 100.0;

static NUTRITION_DB: [(&str, FoodNutrient); 5] = [
    (
        "spinach",
        FoodNutrient {
            name: "Spinach",
            calories: 23.0,
            protein: 2.9,
            carbs: 3.6,
            fat: 0.4,
            iron: 2.7,
            vitamin_c: 28.1,
            calcium: 99.0,
            magnesium: 79.0,
        },
    ),
    (
        "chicken_breast",
        FoodNutrient {
            name: "Chicken Breast",
            calories: 165.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
            iron: 0.7,
            vitamin_c: 0.0,
            calcium: 15.0,
            magnesium: 29.0,
        },
    ),
    (
        "brown_rice",
        FoodNutrient {
            name: "Brown Rice",
            calories: 111.0,
            protein: 2.6,
            carbs: 23.0,
            fat: 0.9,
            iron: 0.4,
            vitamin_c: 0.0,
            calcium: 10.0,
            magnesium: 43.0,
        },
    ),
    (
        "salmon",
        FoodNutrient {
            name: "Salmon",
            calories: 208.0,
            protein: 25.4,
            carbs: 0.0,
            fat: 12.4,
            iron: 0.3,
            vitamin_c: 0.0,
            calcium: 9.0,
            magnesium: 30.0,
        },
    ),
    (
        "lentils",
        FoodNutrient {
            name: "Lentils",
            calories: 116.0,
            protein: 9.0,
            carbs: 20.0,
            fat: 0.4,
            iron: 3.3,
            vitamin_c: 1.5,
            calcium: 19.0,
            magnesium: 36.0,
        },
    ),
];

/// Clave de búsqueda: minúsculas y el primer espacio sustituido por `_`.
fn normalize_key(food: &str) -> String {
    food.to_lowercase().replacen(' ', "_", 1)
}

/// Devuelve el perfil nutricional de un alimento, o `None` si no está en la tabla.
pub fn get_food_nutrients(food_name: &str) -> Option<&'static FoodNutrient> {
    let key = normalize_key(food_name);
    NUTRITION_DB
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, food)| food)
}

/// Suma los nutrientes de una lista de alimentos.
///
/// `portions[i]` indica los gramos del alimento `i`; si falta, es `null`, 0
/// o NaN se toman 100 g. Los alimentos desconocidos no aportan nada.
pub fn calculate_nutrients(foods: &[String], portions: &[Option<f64>]) -> NutrientSummary {
    let mut total = NutrientSummary::default();

    for (index, food) in foods.iter().enumerate() {
        let Some(data) = get_food_nutrients(food) else {
            continue;
        };

        let portion = portions
            .get(index)
            .copied()
            .flatten()
            .filter(|p| *p != 0.0 && !p.is_nan())
            .unwrap_or(DEFAULT_PORTION_GRAMS);
        let multiplier = portion / 100.0;

        total.calories += data.calories * multiplier;
        total.protein += data.protein * multiplier;
        total.carbs += data.carbs * multiplier;
        total.fat += data.fat * multiplier;
        total.iron += data.iron * multiplier;
        total.vitamin_c += data.vitamin_c * multiplier;
        total.calcium += data.calcium * multiplier;
        total.magnesium += data.magnesium * multiplier;
    }

    total
}

/// Búsqueda por subcadena (sin distinguir mayúsculas) sobre el nombre visible.
pub fn search_foods(query: &str) -> Vec<&'static FoodNutrient> {
    let needle = query.to_lowercase();
    NUTRITION_DB
        .iter()
        .map(|(_, food)| food)
        .filter(|food| food.name.to_lowercase().contains(&needle))
        .collect()
}
