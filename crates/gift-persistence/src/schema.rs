// Esquema Diesel (SQLite).
// Tablas: gift_instances, template_overrides
use diesel::allow_tables_to_appear_in_same_query;
diesel::table! {
    gift_instances (id) {
        id -> Text,
        template_id -> BigInt,
        data -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}
diesel::table! {
    template_overrides (template_id) {
        template_id -> BigInt,
        title -> Nullable<Text>,
        price -> Nullable<Double>,
        original_price -> Nullable<Double>,
        tag -> Nullable<Text>,
        is_active -> Nullable<Bool>,
        updated_at -> Text,
    }
}
allow_tables_to_appear_in_same_query!(gift_instances, template_overrides);
