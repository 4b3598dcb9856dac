//! Esquema Diesel (escrito a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    spaces (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Text,
        visit_date -> Text,
        address -> Text,
        contact -> Text,
        email -> Text,
        description -> Text,
        media_urls -> Jsonb,
        rating -> Int2,
        access_tags -> Jsonb,
        theme_tags -> Jsonb,
        disciplines -> Jsonb,
        main_theme -> Text,
        other_themes -> Jsonb,
        interdisciplinary_associations -> Jsonb,
        additional_info -> Text,
        inclusion_tags -> Jsonb,
        additional_inclusion -> Jsonb,
        digital_technologies -> Jsonb,
        didactic_strategies -> Jsonb,
        technology_relationships -> Jsonb,
        technology_developments -> Jsonb,
        contents -> Jsonb,
        objectives -> Jsonb,
        methodologies -> Jsonb,
        evaluations -> Jsonb,
        learning_objective -> Text,
        general_methodology -> Text,
        society_relationship -> Text,
        teacher_contribution -> Text,
        recommended_references -> Text,
        review_count -> Nullable<Int4>,
        #[sql_name = "type"]
        kind -> Nullable<Text>,
        website -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
