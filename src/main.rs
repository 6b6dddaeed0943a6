use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process;
use std::rc::Rc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapmarkers::config::MapConfig;
use mapmarkers::headless::HeadlessMap;
use mapmarkers::map::{LogNotifier, MapHost};
use mapmarkers::{util, PlacementController, Result};

const USAGE: &str = "usage: mapmarkers [--config cfg.json] [--places places.geojson] \
                     [--geojson out.geojson] [--snapshot out.png]";

#[derive(Default)]
struct Args {
    config: Option<String>,
    places: Option<String>,
    geojson: Option<String>,
    snapshot: Option<String>,
}

fn parse_args() -> Option<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        let slot = match flag.as_str() {
            "--config" => &mut args.config,
            "--places" => &mut args.places,
            "--geojson" => &mut args.geojson,
            "--snapshot" => &mut args.snapshot,
            _ => return None,
        };
        *slot = Some(it.next()?);
    }
    Some(args)
}

fn run(args: Args) -> Result<()> {
    let config = match args.config {
        Some(ref p) => MapConfig::from_path(p)?,
        None => MapConfig::default(),
    };
    let notifier = Rc::new(LogNotifier);
    let controller = match args.places {
        Some(ref p) => {
            let locations = util::locations_from_geojson(BufReader::new(File::open(p)?))?;
            PlacementController::with_locations(locations, config.padding, notifier)
        }
        None => PlacementController::with_locations(mapmarkers::places::PLACES.to_vec(),
                                                    config.padding,
                                                    notifier),
    };

    let mut map = HeadlessMap::new(config)?;
    controller.attach(Some(&mut map as &mut dyn MapHost))?;
    map.fire_map_loaded()?;
    info!(state = ?controller.state(), markers = map.markers().len(), "placement done");

    if let (Some(camera), Some(region)) = (map.camera(), map.visible_region()) {
        println!("Camera centered at {} zoom {:.2}", camera.target, camera.zoom);
        println!("Visible region: N {:.4} S {:.4} E {:.4} W {:.4}",
                 region.north,
                 region.south,
                 region.east,
                 region.west);
        let (h, w) = util::real_size(&region);
        println!("Covers about {:.0} km by {:.0} km", h / 1000.0, w / 1000.0);
    }
    for m in map.markers() {
        if let Some(view) = map.info_window_for(m.id)? {
            println!("{} {}", m.position, view.name);
        }
    }
    if let Some(first) = map.markers().first().map(|m| m.id) {
        map.click_info_window(first)?;
    }

    if let Some(p) = args.geojson {
        let json = util::markers_to_geojson(map.markers());
        util::write_geojson(BufWriter::new(File::create(&p)?), &json)?;
        info!(path = %p, "wrote markers");
    }
    if let Some(p) = args.snapshot {
        map.snapshot(&p)?;
        info!(path = %p, "wrote snapshot");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = match parse_args() {
        Some(args) => args,
        None => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
