//! Constantes compartidas del core.

/// Esquema de las URLs de vista previa locales que deben revocarse al
/// terminar un registro.
pub const PREVIEW_URL_SCHEME: &str = "blob:";

/// Mensaje mostrado por la guarda de salida cuando hay cambios sin guardar.
pub const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Are you sure you want to leave? The information entered will be lost.";

/// Segmento de las URLs públicas que precede a la ruta del objeto.
pub const MEDIA_BUCKET: &str = "spaces";

/// Búsqueda de Google Maps por dirección.
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Etiquetas temáticas visibles en la tarjeta resumen.
pub const SUMMARY_THEME_TAGS: usize = 3;
