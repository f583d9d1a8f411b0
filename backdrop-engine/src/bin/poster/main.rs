// poster - Render a still frame of a backdrop scene to PNG
//
// Usage: cargo run --bin poster -- [--scene skyline|spaceport|globe]
//        [--width 1600] [--height 900] [--time 12] [--seed 7] [--out poster.png]
//
// The frame is what the page would show at time T with the given seed, minus
// textures. Used as the static fallback for reduced-motion visitors.

mod raster;

use std::env;
use std::path::PathBuf;
use std::process;

use backdrop_engine::lifecycle::TextureTable;
use backdrop_engine::{build_scene, Animator, Encoder, Rng, SceneConfig, SceneKind, Viewport};
use thiserror::Error;

use raster::{Camera, Canvas};

const USAGE: &str =
    "Usage: poster [--scene skyline|spaceport|globe] [--width N] [--height N] [--time T] [--seed S] [--out FILE]";

/// Seconds of motion simulated before the captured frame, so trails and
/// meteors have history.
const WARMUP: f32 = 4.0;
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Error)]
enum PosterError {
    #[error("{0}")]
    Usage(String),
    #[error("could not write image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug)]
struct Options {
    scene: SceneKind,
    width: u32,
    height: u32,
    time: f32,
    seed: u32,
    out: PathBuf,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, PosterError> {
        let mut opts = Options {
            scene: SceneKind::Skyline,
            width: 1600,
            height: 900,
            time: 12.0,
            seed: 7,
            out: PathBuf::from("poster.png"),
        };
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let value = args.next().ok_or_else(|| PosterError::Usage(format!("{flag} needs a value")))?;
            let bad = || PosterError::Usage(format!("bad value for {flag}: {value}"));
            match flag.as_str() {
                "--scene" => opts.scene = SceneKind::parse(&value).ok_or_else(bad)?,
                "--width" => opts.width = value.parse().map_err(|_| bad())?,
                "--height" => opts.height = value.parse().map_err(|_| bad())?,
                "--time" => opts.time = value.parse().map_err(|_| bad())?,
                "--seed" => opts.seed = value.parse().map_err(|_| bad())?,
                "--out" => opts.out = PathBuf::from(&value),
                _ => return Err(PosterError::Usage(format!("unknown flag {flag}"))),
            }
        }
        if opts.width == 0 || opts.height == 0 {
            return Err(PosterError::Usage("width and height must be positive".into()));
        }
        if !opts.time.is_finite() || opts.time < 0.0 {
            return Err(PosterError::Usage("time must be a non-negative number".into()));
        }
        Ok(opts)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            process::exit(2);
        }
    };
    if let Err(err) = run(&opts) {
        log::error!("{err}");
        process::exit(1);
    }
}

/// Frame times over the warmup window, ending exactly on `time`. Counted in
/// whole frames so late times, where f32 steps are coarse, still finish.
fn warmup_times(time: f32) -> impl Iterator<Item = f32> {
    let start = (time - WARMUP).max(0.0);
    let frames = ((time - start) / FRAME_DT) as u32;
    (0..frames).map(move |i| start + i as f32 * FRAME_DT).chain(std::iter::once(time))
}

fn run(opts: &Options) -> Result<(), PosterError> {
    log::info!("rendering {:?} at {}x{}, t={}s, seed {}", opts.scene, opts.width, opts.height, opts.time, opts.seed);

    let config = SceneConfig::default();
    let viewport = Viewport::new(opts.width as f32, opts.height as f32, 1.0, false);
    let mut rng = Rng::new(opts.seed);
    let mut scene = build_scene(opts.scene, viewport.state(), &config, &mut rng);

    let mut animator = Animator::new();
    for t in warmup_times(opts.time) {
        animator.step(&mut scene, t, &mut rng);
    }

    // No textures offline; every slot stays pending
    let textures = TextureTable::new(config.textures.clone());
    let mut encoder = Encoder::new();
    encoder.encode(&scene, opts.time, &textures);
    log::debug!("encoded {} records", encoder.records());

    let camera = Camera::for_scene(opts.scene, viewport.projection(), opts.width, opts.height);
    let mut canvas = Canvas::new(opts.width, opts.height);
    let drawn = canvas.draw(encoder.as_slice(), &camera);
    canvas.into_image().save(&opts.out)?;

    log::info!("wrote {} ({drawn} of {} records drawn)", opts.out.display(), encoder.records());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let opts = Options::parse(Vec::new()).unwrap();
        assert_eq!(opts.scene, SceneKind::Skyline);
        assert_eq!((opts.width, opts.height), (1600, 900));
    }

    #[test]
    fn flags_override_defaults() {
        let opts = Options::parse(args(&["--scene", "spaceport", "--width", "640", "--seed", "3", "--out", "x.png"])).unwrap();
        assert_eq!(opts.scene, SceneKind::Spaceport);
        assert_eq!(opts.width, 640);
        assert_eq!(opts.seed, 3);
        assert_eq!(opts.out, PathBuf::from("x.png"));
    }

    #[test]
    fn warmup_ends_on_requested_time() {
        let times: Vec<f32> = warmup_times(10.0).collect();
        assert_eq!(times.len(), (WARMUP / FRAME_DT) as usize + 1);
        assert_eq!(times.last(), Some(&10.0));
        assert!(times.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(warmup_times(0.0).collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn warmup_is_bounded_for_late_times() {
        let opts = Options::parse(args(&["--time", "600000"])).unwrap();
        let times: Vec<f32> = warmup_times(opts.time).collect();
        assert!(times.len() <= (WARMUP / FRAME_DT) as usize + 2);
        assert_eq!(times.last(), Some(&600_000.0));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Options::parse(args(&["--scene", "ocean"])).is_err());
        assert!(Options::parse(args(&["--width"])).is_err());
        assert!(Options::parse(args(&["--height", "0"])).is_err());
        assert!(Options::parse(args(&["--fps", "30"])).is_err());
    }
}
