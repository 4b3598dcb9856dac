//! Demo del asistente: registra un espacio en memoria recorriendo los seis
//! pasos, lo edita y lo lista. Con `--features pg_demo` y
//! `SABERES_RUN_PG_DEMO=1` repite el registro sobre Postgres.

use saberes::core::{space_steps, InMemoryObjectStorage, InMemorySpaceGateway, PersistenceGateway, SpaceSummary};
use saberes::{Actor, CoreError, Directory, ExitGuard, Field, FieldValue, Role, Wizard};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn fill_about<G: PersistenceGateway>(wizard: &mut Wizard<G>) -> Result<(), CoreError> {
    wizard.on_field_change(Field::Name, FieldValue::text("Museu de Ciências"))?;
    wizard.on_field_change(Field::VisitDate, FieldValue::text("2024-05-10"))?;
    wizard.on_field_change(Field::Address, FieldValue::text("Rua das Flores 123, Recife"))?;
    wizard.on_field_change(Field::Contact, FieldValue::text("+55 81 5555-0000"))?;
    wizard.on_field_change(Field::Email, FieldValue::text("contato@museu.example"))?;
    wizard.on_field_change(Field::Description, FieldValue::text("Museu interativo de ciências"))?;
    wizard.on_field_change(Field::Rating, FieldValue::Rating(4))?;
    Ok(())
}

fn run_register<G: PersistenceGateway>(gateway: G, actor: &Actor) -> Result<G, CoreError> {
    let mut wizard = Wizard::register(gateway);
    fill_about(&mut wizard)?;
    wizard.advance()?;
    wizard.toggle_tag(Field::ThemeTags, "Sustainability")?;
    wizard.toggle_tag(Field::ThemeTags, "Local culture")?;
    println!("[demo] paso {} de {}", wizard.current_step() + 1, wizard.step_count());

    let mut storage = InMemoryObjectStorage::default();
    wizard.attach_media(&mut storage, Some(actor), "fachada.jpg", b"jpeg")?;

    println!("[demo] salida: {:?}", ExitGuard::check(&wizard));
    while !wizard.is_last_step() {
        wizard.advance()?;
    }
    for e in wizard.validation_errors() {
        println!("[demo] aviso {}: {}", e.field, e.message);
    }
    let space = wizard.submit(Some(actor))?;
    println!("[demo] registrado {} ({})", space.id, space.fields.name);

    wizard.on_field_change(Field::Rating, FieldValue::Rating(5))?;
    println!("[demo] tras editar rating dirty={}", wizard.is_dirty());
    wizard.save_changes(Some(actor))?;
    println!("[demo] salida tras guardar: {:?}", ExitGuard::check(&wizard));
    Ok(wizard.into_gateway())
}

#[cfg(feature = "pg_demo")]
fn maybe_run_pg_demo(actor: &Actor) {
    use saberes::persistence::{build_dev_pool_from_env, migrations::run_pending_migrations, PgSpaceGateway,
                               PoolProvider};

    if std::env::var("SABERES_RUN_PG_DEMO").ok().as_deref() != Some("1") {
        return;
    }
    let pool = match build_dev_pool_from_env() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[pg_demo] sin pool: {e}");
            return;
        }
    };
    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = run_pending_migrations(&mut conn) {
                eprintln!("[pg_demo] migraciones: {e}");
                return;
            }
        }
        Err(e) => {
            eprintln!("[pg_demo] conexión: {e}");
            return;
        }
    }
    match run_register(PgSpaceGateway::new(PoolProvider { pool }), actor) {
        Ok(_) => println!("[pg_demo] OK"),
        Err(e) => eprintln!("[pg_demo] {e}"),
    }
}

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env())
                             .with_writer(std::io::stderr)
                             .init();

    println!("[demo] pasos: {}", space_steps().steps().iter().map(|s| s.title).collect::<Vec<_>>().join(" → "));
    let actor = Actor::new(Uuid::new_v4(), "curadora@saberes.example", Role::Curator);

    let gateway = match run_register(InMemorySpaceGateway::new(), &actor) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("[demo] error: {e}");
            std::process::exit(1);
        }
    };
    match Directory::new(gateway).list() {
        Ok(spaces) => {
            for s in spaces.iter().map(SpaceSummary::from) {
                println!("[demo] {} {} {} {}", s.name, s.rating_label, s.theme_tags.join(", "),
                         s.more_label().unwrap_or_default());
            }
        }
        Err(e) => eprintln!("[demo] listado: {e}"),
    }

    #[cfg(feature = "pg_demo")]
    maybe_run_pg_demo(&actor);
}
