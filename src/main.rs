use anyhow::Context;
use clap::{Parser, ValueEnum};
use sheetprint::platform::{printer_info, FilePrinter, LpPrinter, NoopSessionService, PrintTrigger, SessionService};
use sheetprint::{
    BoothConfig, Compositor, GuideStyle, ImageSelection, LayoutPreset, PrintController, SourceLoader,
    StaticSourceLoader,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Single,
    Four,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// 5% margins, 4% gutters
    Percent,
    /// 6mm margins, 3mm inset per cell
    Millimeter,
}

/// Compose approved booth photos onto a printable sheet
#[derive(Debug, Parser)]
#[command(name = "sheetprint", version, about)]
struct Cli {
    /// JSON config file (flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Booth backend base URL
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, value_enum)]
    mode: Option<Mode>,

    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Draw dotted cut guides
    #[arg(long)]
    guides: bool,

    /// Compose from local image files instead of the backend (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Write the composed sheet preview to this PNG file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Send the sheet to the printer via CUPS `lp`
    #[arg(long)]
    print: bool,

    /// CUPS destination (default printer when omitted)
    #[arg(long)]
    printer: Option<String>,

    /// Show CUPS printer status and exit
    #[arg(long)]
    printer_info: bool,

    /// Reset the backend session after finishing
    #[arg(long)]
    start_new: bool,
}

impl Cli {
    fn booth_config(&self) -> anyhow::Result<BoothConfig> {
        let mut cfg = match &self.config {
            Some(path) => BoothConfig::from_json_file(path)?,
            None => BoothConfig::default(),
        };
        if let Some(url) = &self.base_url {
            cfg.base_url = url.clone();
        }
        if let Some(mode) = self.mode {
            cfg.selection = match mode {
                Mode::Single => ImageSelection::Single,
                Mode::Four => ImageSelection::Four,
            };
        }
        if let Some(layout) = self.layout {
            cfg.layout = match layout {
                Layout::Percent => LayoutPreset::percent_gutter(),
                Layout::Millimeter => LayoutPreset::millimeter_inset(),
            };
        }
        if self.guides && cfg.guides.is_none() {
            cfg.guides = Some(GuideStyle::default());
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// `lp` with `--print`, otherwise print-to-file (`--out`, default `sheet.png`).
    fn print_trigger(&self) -> Box<dyn PrintTrigger> {
        if self.print {
            return Box::new(LpPrinter::new(self.printer.clone()));
        }
        let out = self.out.clone().unwrap_or_else(|| PathBuf::from("sheet.png"));
        Box::new(FilePrinter::new(out))
    }
}

async fn run<L: SourceLoader, S: SessionService>(cli: &Cli, cfg: &BoothConfig, loader: L, session: S) -> anyhow::Result<()> {
    let compositor = Compositor::new(cfg.compositor_config()?, loader)?;
    let mut controller = PrintController::new(compositor, cli.print_trigger(), session);

    if let Err(e) = controller.load().await {
        let recovery = e.recovery();
        log::error!("{} ({})", recovery.user_message(), recovery.path());
        return Err(e).context("failed to compose sheet");
    }

    // with a real printer, --out keeps a copy of the first-load preview
    if let (true, Some(out)) = (cli.print, &cli.out) {
        if let Some(sheet) = controller.preview() {
            std::fs::write(out, &sheet.png_data).with_context(|| format!("failed to write {}", out.display()))?;
            log::info!("preview written to {}", out.display());
        }
    }

    if let Err(e) = controller.print().await {
        let recovery = e.recovery();
        log::error!("{} ({})", recovery.user_message(), recovery.path());
        return Err(e).context("print failed");
    }

    if cli.start_new {
        let reset = controller.start_new_session().await?;
        println!("{}", reset.redirect);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    if cli.printer_info {
        println!("{}", serde_json::to_string_pretty(&printer_info())?);
        return Ok(());
    }

    let cfg = cli.booth_config()?;
    log::info!(
        "sheet {}x{}px ({}dpi), {:?} selection",
        cfg.sheet.width(),
        cfg.sheet.height(),
        cfg.sheet.dpi(),
        cfg.selection
    );

    if !cli.images.is_empty() {
        let loader = StaticSourceLoader::from_files(&cli.images)?;
        return run(&cli, &cfg, loader, NoopSessionService::new()).await;
    }

    #[cfg(feature = "http")]
    {
        let backend = sheetprint::backend::BackendClient::new(&cfg)?;
        let loader = sheetprint::HttpSourceLoader::new(backend.clone());
        let session = sheetprint::platform::HttpSessionService::new(backend);
        run(&cli, &cfg, loader, session).await
    }

    #[cfg(not(feature = "http"))]
    {
        anyhow::bail!("no --image given and the http feature is disabled")
    }
}
