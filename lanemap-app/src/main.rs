use anyhow::Context;
use lanemap::prelude::*;

/// Loads lanes once and reports what the map would show.
///
/// Usage: `lanemap-app [type_names] [semantic_description]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lanemap::init_logging();

    let mut args = std::env::args().skip(1);
    let form = FilterForm::new(
        args.next().unwrap_or_default(),
        args.next().unwrap_or_default(),
    );

    let config = LaneMapConfig::from_env().context("reading configuration")?;
    let mut controller =
        MapViewController::connect(config, Arc::new(form), Arc::new(LogNotifier))
            .context("setting up the map")?;

    match controller.start().await {
        LoadOutcome::Rendered { features, bounds } => {
            let viewport = controller.viewport();
            log::info!(
                "{} lanes between ({:.5}, {:.5}) and ({:.5}, {:.5})",
                features,
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng
            );
            log::info!(
                "view centered on ({:.5}, {:.5}) at zoom {}",
                viewport.center.lat,
                viewport.center.lng,
                viewport.zoom
            );
            if let Some(layer) = controller.lanes_layer() {
                for rendered in layer.rendered() {
                    if let Some(popup) = &rendered.popup {
                        log::debug!("{}", popup.content().replace('\n', " | "));
                    }
                }
            }
        }
        LoadOutcome::NoResults => log::info!("nothing to show"),
        LoadOutcome::Failed(error) => return Err(error).context("loading lanes"),
        LoadOutcome::Stale { .. } => {}
    }

    if let Some(base) = controller.base_layer() {
        let tiles = base.visible_tiles(controller.viewport());
        log::info!("{} base tiles visible ({})", tiles.len(), base.attribution());
        for tile in tiles {
            log::debug!("{}", base.tile_url(tile));
        }
    }

    Ok(())
}
