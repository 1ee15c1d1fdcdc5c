use gift_domain::{Catalog, DataRecord, TemplateDefinition, TemplateOverride};
use gift_flow::{DataStore, Effect, Effects, EngineConfig, GiftService, GiftSession, StepInput, StepView,
                TemplateOverrideSource};
use gift_persistence::DieselDataStore;
use serde_json::Value;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Efectos dibujados como texto en la terminal.
struct TerminalEffects;

impl Effects for TerminalEffects {
    fn trigger(&self, effect: &Effect) {
        match effect {
            Effect::Confetti { particles } => println!("  * confeti ({} partículas) *", particles),
            Effect::Audio { cue } => println!("  ♪ {} ♪", cue),
            Effect::Reload => println!("  ~ fin de la experiencia, volviendo al inicio ~"),
        }
    }
}

/// Pequeño menú interactivo para el catálogo de regalos digitales usando el
/// almacén SQLite de `gift-persistence`.
///
/// Opciones soportadas:
/// 1) Ver catálogo
/// 2) Crear instancia de regalo
/// 3) Ver instancias
/// 4) Reproducir instancia
/// 5) Editar instancia
/// 6) Campos requeridos pendientes de una instancia
/// 7) Override de plantilla (precio / estado)
/// 8) Salir
fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Inicializar almacén (aplica migraciones embebidas)
    let store = Arc::new(gift_persistence::new_from_env()?);
    let service = GiftService::new(store.clone(), EngineConfig::default()).with_effects(Arc::new(TerminalEffects));

    loop {
        let catalog = load_catalog(store.as_ref())?;
        println!("\n== Gift CLI menu ==");
        println!("1) Ver catálogo");
        println!("2) Crear instancia de regalo");
        println!("3) Ver instancias");
        println!("4) Reproducir instancia");
        println!("5) Editar instancia");
        println!("6) Campos requeridos pendientes");
        println!("7) Override de plantilla");
        println!("8) Salir");
        let choice = prompt("Elige una opción: ")?;
        match choice.trim() {
            "1" => print_catalog(&catalog),
            "2" => {
                let Some(template) = pick_template(&catalog)? else {
                    continue;
                };
                let data = ask_required_fields(template)?;
                match service.create_instance(template, data) {
                    Ok(id) => println!("Instancia creada: {}", id),
                    Err(e) => eprintln!("Error creando instancia: {}", e),
                }
            }
            "3" => print_instances(store.as_ref(), &catalog),
            "4" | "5" => {
                let Some((id, template_id)) = pick_instance(store.as_ref())? else {
                    continue;
                };
                let Some(template) = catalog.by_id(template_id) else {
                    eprintln!("La plantilla {} ya no existe en el catálogo", template_id);
                    continue;
                };
                let mut session = service.open_session(id, gift_steps::build_registry(template));
                if choice.trim() == "5" {
                    session.set_editing(true);
                }
                play(&mut session)?;
                session.flush();
            }
            "6" => {
                let Some((id, template_id)) = pick_instance(store.as_ref())? else {
                    continue;
                };
                match (catalog.by_id(template_id), store.get(&id)) {
                    (Some(template), Ok(data)) => {
                        let missing = template.missing_fields(&data);
                        if missing.is_empty() {
                            println!("Todos los campos requeridos están completos");
                        }
                        for (step, fields) in missing {
                            println!("{:<4} {}", step, fields.join(", "));
                        }
                    }
                    (None, _) => eprintln!("Plantilla {} desconocida", template_id),
                    (_, Err(e)) => eprintln!("Error leyendo instancia: {}", e),
                }
            }
            "7" => {
                let Some(template) = pick_template(&catalog)? else {
                    continue;
                };
                let price = prompt("Nuevo precio (enter para no cambiar): ")?;
                let active = prompt("Activa? (s/n, enter para no cambiar): ")?;
                let ov = TemplateOverride { template_id: template.id,
                                            price: price.trim().parse().ok(),
                                            is_active: match active.trim() {
                                                "s" => Some(true),
                                                "n" => Some(false),
                                                _ => None,
                                            },
                                            ..Default::default() };
                match store.put_override(&ov) {
                    Ok(()) => println!("Override guardado para {}", template.slug),
                    Err(e) => eprintln!("Error guardando override: {}", e),
                }
            }
            "8" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

/// Catálogo embebido (o `GIFTFLOW_CATALOG`) con los overrides del almacén.
fn load_catalog(store: &DieselDataStore) -> Result<Catalog, Box<dyn Error>> {
    let mut catalog = match std::env::var("GIFTFLOW_CATALOG") {
        Ok(path) => Catalog::from_path(&path)?,
        Err(_) => Catalog::builtin()?,
    };
    match store.list_overrides() {
        Ok(overrides) => {
            catalog.apply_overrides(&overrides);
        }
        Err(e) => log::warn!("no se pudieron leer los overrides: {}", e),
    }
    Ok(catalog)
}

fn print_catalog(catalog: &Catalog) {
    for category in catalog.categories() {
        println!("\n[{}]", category);
        for t in catalog.by_category(category) {
            let tag = t.tag.as_deref().map(|s| format!(" ({})", s)).unwrap_or_default();
            println!("  {:>2} {:<20} {:<22} {} -{}%{}",
                     t.id,
                     t.slug,
                     t.title,
                     t.display_price(),
                     t.discount_percent(),
                     tag);
        }
    }
}

fn print_instances(store: &DieselDataStore, catalog: &Catalog) {
    match store.list_instances() {
        Ok(instances) => {
            println!("\n#   ID                                   | TEMPLATE             | CAMPOS");
            println!("-----------------------------------------------------------------------------");
            for (i, inst) in instances.iter().enumerate() {
                let slug = catalog.by_id(inst.template_id).map(|t| t.slug.as_str()).unwrap_or("<desconocida>");
                println!("{:<3} {} | {:<20} | {}", i + 1, inst.id, slug, inst.data.len());
            }
        }
        Err(e) => eprintln!("Error listando instancias: {}", e),
    }
}

fn pick_template(catalog: &Catalog) -> io::Result<Option<&TemplateDefinition>> {
    let key = prompt("Plantilla (id o slug): ")?;
    let key = key.trim();
    let found = key.parse::<i64>().ok().and_then(|id| catalog.by_id(id)).or_else(|| catalog.by_slug(key));
    if found.is_none() {
        eprintln!("Plantilla desconocida: {}", key);
    }
    Ok(found)
}

fn pick_instance(store: &DieselDataStore) -> io::Result<Option<(Uuid, i64)>> {
    let instances = match store.list_instances() {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error listando instancias: {}", e);
            return Ok(None);
        }
    };
    let key = prompt("Instancia (número de la lista o UUID): ")?;
    let key = key.trim();
    let found = match key.parse::<usize>() {
        Ok(n) if n >= 1 => instances.get(n - 1),
        _ => Uuid::parse_str(key).ok().and_then(|id| instances.iter().find(|i| i.id == id)),
    };
    match found {
        Some(inst) => Ok(Some((inst.id, inst.template_id))),
        None => {
            eprintln!("Instancia no encontrada: {}", key);
            Ok(None)
        }
    }
}

/// Pide los campos requeridos de todas las páginas (sin repetir).
fn ask_required_fields(template: &TemplateDefinition) -> io::Result<DataRecord> {
    let mut data = DataRecord::new();
    println!("Campos de '{}' (enter para usar el valor por defecto; listas separadas por '|'):",
             template.title);
    for page in &template.pages {
        for field in &page.required_fields {
            if data.contains(field) {
                continue;
            }
            let raw = prompt(&format!("  {}: ", field))?;
            if let Some(value) = parse_input_value(&raw) {
                data.merge(field.clone(), value);
            }
        }
    }
    Ok(data)
}

/// JSON si lo parece; texto con `|` como lista; si no, texto plano.
fn parse_input_value(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(v) = serde_json::from_str(raw) {
            return Some(v);
        }
    }
    if raw.contains('|') {
        let items = raw.split('|').map(str::trim).filter(|s| !s.is_empty()).map(|s| Value::String(s.into()));
        return Some(Value::Array(items.collect()));
    }
    Some(Value::String(raw.to_string()))
}

fn print_view(view: &StepView) {
    let mode = if view.editing { " [edición]" } else { "" };
    println!("\n--- {} · {}{} ---", view.step_id, view.title, mode);
    for f in &view.fields {
        let marker = if f.from_default { " (por defecto)" } else { "" };
        println!("  {}: {}{}", f.label, f.display(), marker);
        if let Some(edit) = &f.edit {
            println!("      editar con: e {} <valor>   (actual: {})", edit.field, edit.prompt);
        }
    }
    for img in &view.images {
        let marker = if img.placeholder { " (placeholder)" } else { "" };
        println!("  [imagen] {}{}", img.src, marker);
    }
    if let Some(status) = &view.status {
        println!("  > {}", status);
    }
    let actions: Vec<String> = view.actions.iter().map(|a| format!("{} ({})", a.id, a.label)).collect();
    if !actions.is_empty() {
        println!("  acciones: {}", actions.join(", "));
    }
}

/// Bucle de reproducción. El tiempo es virtual: `w <ms>` lo hace avanzar.
fn play(session: &mut GiftSession) -> io::Result<()> {
    println!("Comandos: a <acción> | s <0-100> | d <elemento> <destino> | e <campo> <valor> | f <imagen> | w <ms> \
              | g <paso> | m (modo edición) | q (salir)");
    loop {
        let view = session.view();
        print_view(&view);
        let line = prompt("» ")?;
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match cmd {
            "a" => session.dispatch(StepInput::action(rest)),
            "s" => match rest.parse::<f64>() {
                Ok(v) => session.dispatch(StepInput::Slider(v)),
                Err(_) => eprintln!("Valor de slider inválido"),
            },
            "d" => match rest.split_once(' ') {
                Some((item, target)) => session.dispatch(StepInput::drop_on(item.trim(), target.trim())),
                None => eprintln!("Uso: d <elemento> <destino>"),
            },
            "e" => {
                let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
                let value = parse_input_value(value).unwrap_or(Value::String(String::new()));
                session.dispatch(StepInput::edit(field, value));
            }
            "f" => session.dispatch(StepInput::AssetFailed { src: rest.to_string() }),
            "w" => match rest.parse::<u64>() {
                Ok(ms) => session.advance_time(Duration::from_millis(ms)),
                Err(_) => eprintln!("Milisegundos inválidos"),
            },
            "g" => {
                let editing = view.editing;
                session.render(rest, editing);
            }
            "m" => {
                let editing = !view.editing;
                session.set_editing(editing);
            }
            "q" => return Ok(()),
            "" => {}
            other => println!("Comando inválido: {}", other),
        }
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    if io::stdin().read_line(&mut s)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "entrada cerrada"));
    }
    Ok(s)
}
