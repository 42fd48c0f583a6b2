use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use clap::{ArgEnum, Parser, Subcommand};
use log::{debug, info};

use transfer_admin::events::AppEvent;
use transfer_admin::notifications::format_relative;
use transfer_admin::prelude::*;
use transfer_admin::push::{DisplayNotification, NotificationSurface, Permission};
use transfer_admin::reservations::{CalendarView, NewReservation, Reservation, ReservationPatch};
use transfer_admin::session::{Access, Route};

const DEFAULT_SESSION_FILE: &str = ".transfer-admin-session.json";

#[derive(Parser)]
#[clap(name = "transfer-admin", version, about = "Administration console for transport reservations")]
struct Cli {
    /// Base URL of the backend API
    #[clap(long, env = "TRANSFER_ADMIN_API_URL")]
    api_url: String,

    /// Public key used when requesting push tokens
    #[clap(long, env = "TRANSFER_ADMIN_VAPID_KEY", default_value = "")]
    vapid_key: String,

    /// File the session is kept in between invocations
    #[clap(long, env = "TRANSFER_ADMIN_SESSION_FILE", default_value = DEFAULT_SESSION_FILE)]
    session_file: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as an administrator
    Login {
        email: String,
        #[clap(long, env = "TRANSFER_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Review and edit reservations
    #[clap(subcommand)]
    Reservations(ReservationCommand),
    /// Show the reservation calendar
    Calendar {
        #[clap(long, arg_enum, default_value = "day")]
        view: ViewArg,
        /// Day to show, YYYY-MM-DD (defaults to today)
        #[clap(long)]
        date: Option<String>,
    },
    /// List notifications or mark one as read
    #[clap(subcommand)]
    Notifications(NotificationCommand),
    /// Export reservations to a spreadsheet
    Export {
        /// Directory the workbook is written to
        #[clap(long, default_value = ".")]
        dir: PathBuf,
        /// Only these reservations (every reservation when omitted)
        #[clap(long = "id")]
        ids: Vec<String>,
    },
    /// Keep the calendar and notifications refreshed and print what changes
    Watch,
}

#[derive(Subcommand)]
enum ReservationCommand {
    List {
        #[clap(long)]
        estado: Option<String>,
        #[clap(long)]
        buscar: Option<String>,
        #[clap(long)]
        id: Option<String>,
    },
    Accept {
        id: String,
    },
    Reject {
        id: String,
    },
    Update {
        id: String,
        #[clap(long)]
        monto: Option<f64>,
        #[clap(long)]
        comision: Option<f64>,
        #[clap(long)]
        chofer: Option<String>,
        #[clap(long)]
        vuelo: Option<String>,
    },
    Create {
        #[clap(long)]
        nombre: String,
        #[clap(long)]
        telefono: String,
        #[clap(long)]
        correo: String,
        /// Local date and time, e.g. 2026-10-20T08:30
        #[clap(long)]
        fecha: String,
        #[clap(long)]
        recogida: String,
        #[clap(long)]
        destino: String,
        #[clap(long, default_value = "1")]
        personas: u32,
    },
}

#[derive(Subcommand)]
enum NotificationCommand {
    List,
    Read { id: String },
}

#[derive(ArgEnum, Clone, Copy)]
enum ViewArg {
    Day,
    Week,
    Month,
}

impl From<ViewArg> for CalendarView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Day => CalendarView::Day,
            ViewArg::Week => CalendarView::Week,
            ViewArg::Month => CalendarView::Month,
        }
    }
}

/// Prints local notifications to the terminal
struct ConsoleSurface;

#[async_trait]
impl NotificationSurface for ConsoleSurface {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Result<Permission, Error> {
        Ok(Permission::Granted)
    }

    async fn show(&self, notification: DisplayNotification) -> Result<(), Error> {
        println!("🔔 {}: {}", notification.title, notification.body);
        Ok(())
    }

    async fn close(&self, _notification: &DisplayNotification) -> Result<(), Error> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = AdminConfig::new(&cli.api_url, &cli.vapid_key)?.with_session_file(&cli.session_file);
    let panel = AdminPanel::builder(config)
        .notification_surface(Arc::new(ConsoleSurface))
        .build()?;

    match cli.command {
        Command::Login { email, password } => {
            let session = panel
                .login(&email, &password)
                .await
                .map_err(|e| anyhow!(e.user_message("Error al iniciar sesión. Por favor, intente nuevamente.")))?;
            println!("Signed in as {}", session.user.email.as_deref().unwrap_or(&session.user.id));
        }
        Command::Logout => {
            panel.logout();
            println!("Signed out");
        }
        Command::Reservations(command) => {
            require(&panel, Route::Reservations)?;
            reservations(&panel, command).await?;
        }
        Command::Calendar { view, date } => {
            require(&panel, Route::Calendar)?;
            let anchor = match date {
                Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("invalid date {}", date))?,
                None => Local::now().date_naive(),
            };
            let calendar = panel.calendar();
            calendar.load().await?;
            for event in calendar.events_in_view(view.into(), anchor, &Local).await {
                println!(
                    "{}  [{}] {}",
                    event.start.with_timezone(&Local).format("%d/%m %H:%M"),
                    event.status,
                    event.title
                );
            }
        }
        Command::Notifications(command) => {
            require(&panel, Route::Notifications)?;
            let center = panel.notification_center();
            center.reconcile().await?;
            match command {
                NotificationCommand::List => {
                    let now = Utc::now();
                    for n in center.notifications().await {
                        let marker = if n.read { " " } else { "•" };
                        println!(
                            "{} {}  {} - {} ({})",
                            marker,
                            n.id,
                            n.title,
                            n.message,
                            format_relative(n.created_at, now)
                        );
                    }
                    println!("{} unread", center.unread_count().await);
                }
                NotificationCommand::Read { id } => {
                    let result = center.mark_read(&id).await?;
                    debug!("mark_read({}) -> {:?}", id, result);
                }
            }
        }
        Command::Export { dir, ids } => {
            require(&panel, Route::ReservationTable)?;
            let table = panel.table();
            table.load().await?;
            if !ids.is_empty() {
                table.set_selection_mode(true).await;
                for id in &ids {
                    table.toggle(id).await;
                }
            }
            let path = table.export(&dir, Local::now().date_naive(), &Local).await?;
            println!("Wrote {}", path.display());
        }
        Command::Watch => {
            require(&panel, Route::Calendar)?;
            watch(&panel).await?;
        }
    }

    Ok(())
}

/// Refuse to run a command whose page would redirect to login
fn require(panel: &AdminPanel, route: Route) -> Result<()> {
    match panel.guard().check(route) {
        Access::Granted => Ok(()),
        Access::Redirect(_) => bail!("Not signed in as an administrator, run `transfer-admin login` first"),
    }
}

async fn reservations(panel: &AdminPanel, command: ReservationCommand) -> Result<()> {
    let client = panel.reservations();
    match command {
        ReservationCommand::List { estado, buscar, id } => {
            let mut query = ReservationQuery::new();
            if let Some(estado) = estado {
                query = query.status(estado.parse()?);
            }
            if let Some(buscar) = buscar {
                query = query.search(&buscar);
            }
            if let Some(id) = id {
                query = query.id(&id);
            }
            let list = client.list(&query).await?;
            if list.is_empty() {
                println!("No reservations");
            }
            for r in &list {
                print_reservation(r);
            }
        }
        ReservationCommand::Accept { id } => {
            client
                .accept(&id)
                .await
                .map_err(|e| anyhow!(e.user_message("Error al aceptar la reserva")))?;
            println!("Reserva aceptada exitosamente");
        }
        ReservationCommand::Reject { id } => {
            client
                .reject(&id)
                .await
                .map_err(|e| anyhow!(e.user_message("Error al rechazar la reserva")))?;
            println!("Reserva rechazada");
        }
        ReservationCommand::Update {
            id,
            monto,
            comision,
            chofer,
            vuelo,
        } => {
            let patch = ReservationPatch {
                amount: monto,
                commission: comision,
                driver: chofer,
                flight: vuelo,
            };
            if patch.is_empty() {
                bail!("Nothing to update");
            }
            client
                .update(&id, &patch)
                .await
                .map_err(|e| anyhow!(e.user_message("Error al guardar cambios")))?;
            print_reservation(&client.get(&id).await?);
        }
        ReservationCommand::Create {
            nombre,
            telefono,
            correo,
            fecha,
            recogida,
            destino,
            personas,
        } => {
            let form = NewReservation {
                name: nombre,
                phone: telefono,
                email: correo,
                service_at: fecha,
                pickup: recogida,
                destination: destino,
                passengers: personas,
            };
            client
                .create(&form)
                .await
                .map_err(|e| anyhow!(e.user_message("Error al crear la reserva")))?;
            println!("Reserva creada exitosamente");
        }
    }
    Ok(())
}

fn print_reservation(r: &Reservation) {
    println!(
        "{}  {}  [{}] {} ({}) {} → {}, {} pax, vuelo {}, chofer {}",
        r.id,
        r.service_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
        r.status,
        r.name,
        r.phone,
        r.pickup,
        r.destination,
        r.passengers,
        r.flight().unwrap_or("-"),
        r.driver().unwrap_or("-"),
    );
}

async fn watch(panel: &AdminPanel) -> Result<()> {
    let mut events = panel.events().subscribe();
    let calendar = panel.calendar();
    let _refresh = calendar.spawn_refresh(panel.options().calendar_refresh_interval);
    let center = panel.notification_center();
    let _polling = center.spawn_polling(panel.options().notification_poll_interval);
    let _registration = panel.start();

    info!("Watching for changes, press Ctrl-C to stop");
    let mut last_unread = None;
    let mut ticker = tokio::time::interval(panel.options().notification_poll_interval);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(AppEvent::NotificationArrived(n)) => println!("New: {} - {}", n.title, n.message),
                Ok(AppEvent::SessionInvalidated) => println!("Session expired"),
                Ok(AppEvent::Navigate(path)) => {
                    if Route::from_path(&path) == Some(Route::Login) {
                        bail!("Signed out by the server, run `transfer-admin login` again");
                    }
                }
                Err(e) => debug!("Event stream lagged: {}", e),
            },
            _ = ticker.tick() => {
                let unread = center.unread_count().await;
                if last_unread != Some(unread) {
                    println!(
                        "{} reservations on the calendar, {} unread notifications",
                        calendar.reservations().await.len(),
                        unread
                    );
                    last_unread = Some(unread);
                }
            }
        }
    }
    Ok(())
}
