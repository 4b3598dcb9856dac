//! CLI del directorio de espacios.
//!
//! `saberes list [--search <TXT>] [--json]`
//! `saberes show <ID>`
//! `saberes delete <ID>`
//! `saberes register --input <ARCHIVO.json> [--blocking]`
//! `saberes edit <ID> --set campo=valor ... [--blocking]`
//! `saberes attach <ID> <ARCHIVO>`
//! `saberes steps`
//!
//! El actor se lee de `SABERES_ACTOR_ID`, `SABERES_ACTOR_EMAIL` y
//! `SABERES_ACTOR_ROLE`. Todo salvo `steps` requiere `DATABASE_URL`.

mod commands;

use std::path::PathBuf;
use std::process::exit;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use saberes_core::{CoreError, ValidationMode};
use uuid::Uuid;

fn cli() -> Command {
    let id = || {
        Arg::new("id").required(true)
                      .value_parser(value_parser!(Uuid))
                      .help("Identificador del espacio")
    };
    let blocking = || {
        Arg::new("blocking").long("blocking")
                            .action(ArgAction::SetTrue)
                            .help("Rechaza el envío si algún paso tiene errores de validación")
    };
    Command::new("saberes").version(env!("CARGO_PKG_VERSION"))
                           .about("Directorio de espacios educativos")
                           .subcommand_required(true)
                           .arg_required_else_help(true)
                           .subcommand(Command::new("list").about("Lista los espacios, más recientes primero")
                                                           .arg(Arg::new("search").long("search")
                                                                                  .help("Filtra por nombre, descripción o dirección"))
                                                           .arg(Arg::new("json").long("json")
                                                                                .action(ArgAction::SetTrue)
                                                                                .help("Salida JSON")))
                           .subcommand(Command::new("show").about("Muestra un espacio").arg(id()))
                           .subcommand(Command::new("delete").about("Elimina un espacio").arg(id()))
                           .subcommand(Command::new("register").about("Registra un espacio desde un JSON campo → valor")
                                                               .arg(Arg::new("input").long("input")
                                                                                     .required(true)
                                                                                     .value_parser(value_parser!(PathBuf)))
                                                               .arg(blocking()))
                           .subcommand(Command::new("edit").about("Edita campos de un espacio")
                                                           .arg(id())
                                                           .arg(Arg::new("set").long("set")
                                                                               .required(true)
                                                                               .action(ArgAction::Append)
                                                                               .help("campo=valor (JSON o texto)"))
                                                           .arg(blocking()))
                           .subcommand(Command::new("attach").about("Adjunta (o reemplaza) el medio de un espacio")
                                                             .arg(id())
                                                             .arg(Arg::new("file").required(true)
                                                                                  .value_parser(value_parser!(PathBuf))))
                           .subcommand(Command::new("steps").about("Muestra los pasos del formulario"))
}

fn validation(args: &ArgMatches) -> ValidationMode {
    if args.get_flag("blocking") {
        ValidationMode::Blocking
    } else {
        ValidationMode::Soft
    }
}

fn id_of(args: &ArgMatches) -> Uuid {
    // `id` es obligatorio y ya fue validado por clap.
    *args.get_one::<Uuid>("id").unwrap_or(&Uuid::nil())
}

/// Códigos de salida: 3 autenticación/permisos, 4 rechazo del dominio,
/// 5 backend.
fn exit_code(err: &CoreError) -> i32 {
    match err {
        CoreError::Unauthenticated | CoreError::Forbidden => 3,
        CoreError::Persistence(_) | CoreError::Storage(_) => 5,
        _ => 4,
    }
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                             .with_writer(std::io::stderr)
                             .init();

    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("steps", _)) => {
            commands::steps();
            Ok(())
        }
        Some((name, args)) => {
            let backend = match commands::Backend::from_env() {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("[saberes {name}] {e}");
                    exit(5);
                }
            };
            let actor = commands::actor_from_env();
            match name {
                "list" => commands::list(backend, args.get_one::<String>("search").map(String::as_str), args.get_flag("json")),
                "show" => commands::show(backend, id_of(args)),
                "delete" => commands::delete(backend, actor.as_ref(), id_of(args)),
                "register" => match args.get_one::<PathBuf>("input") {
                    Some(path) => commands::register(backend, actor.as_ref(), path, validation(args)),
                    None => Err(CoreError::Domain("--input requerido".into())),
                },
                "edit" => {
                    let sets: Vec<String> = args.get_many::<String>("set").into_iter().flatten().cloned().collect();
                    commands::edit(backend, actor.as_ref(), id_of(args), &sets, validation(args))
                }
                "attach" => match args.get_one::<PathBuf>("file") {
                    Some(path) => commands::attach(backend, actor.as_ref(), id_of(args), path),
                    None => Err(CoreError::Domain("archivo requerido".into())),
                },
                other => Err(CoreError::Domain(format!("subcomando desconocido: {other}"))),
            }
        }
        None => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("error: {e}");
        exit(exit_code(&e));
    }
}
