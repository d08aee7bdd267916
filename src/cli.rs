use crate::profile::ProfilePreset;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "snapurl",
    about = "Compress images and turn them into shareable URLs",
    long_about = "snapurl shrinks images for the web and uploads them to an object store, \
                  printing a public URL for each one. Files are processed one after another; \
                  a failing file is reported and the rest of the batch continues.",
    version,
    after_help = "EXAMPLES:\n  \
    snapurl upload photo.jpg --out-dir ./public --public-base-url https://cdn.example.com\n  \
    snapurl upload ./shots -r --profile small --copy\n  \
    snapurl upload screenshot.png --store walrus --temp\n  \
    snapurl compress input.png output.jpg --profile tiny\n  \
    snapurl profiles"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Print debug diagnostics to stderr",
        long_help = "Print debug diagnostics to stderr. RUST_LOG overrides both --quiet and --verbose."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Compression settings shared by `upload` and `compress`
#[derive(ClapArgs, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(
        short = 'P',
        long,
        value_enum,
        default_value_t = ProfilePreset::Balanced,
        env = "SNAPURL_PROFILE",
        help = "Compression profile",
        long_help = "Named compression profile. Run `snapurl profiles` to list them. \
                     --max-dimension, --quality and --format override single fields."
    )]
    pub profile: ProfilePreset,

    #[arg(
        short = 'm',
        long,
        help = "Maximum width or height in pixels",
        long_help = "Longest side of the output. Smaller images are never upscaled; \
                     the aspect ratio is preserved."
    )]
    pub max_dimension: Option<u32>,

    #[arg(
        short = 'q',
        long,
        help = "Encoder quality (0.0-1.0)",
        long_help = "Encoder quality from 0.0 (smallest) to 1.0 (best). \
                     For PNG: >=0.9 uses Zopfli, >=0.7 uses high compression, lower uses standard compression. \
                     WebP output is lossless and ignores it."
    )]
    pub quality: Option<f32>,

    #[arg(
        short = 'f',
        long,
        help = "Output format (jpeg, png, webp, passthrough)",
        long_help = "Force the output format. `passthrough` uploads the original bytes untouched."
    )]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Local directory, optionally served under a base URL
    Dir,
    /// Walrus decentralized storage
    Walrus,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress images and upload them",
        long_about = "Compress every input with the selected profile, store it and print its public URL. \
                      Inputs may be files, directories or glob patterns."
    )]
    Upload {
        #[arg(
            required = true,
            help = "Image files, directories or glob patterns",
            long_help = "Inputs are processed in the order given. Directory entries are sorted by name. \
                         Examples: 'photo.jpg', './images', './shots/*.png'"
        )]
        inputs: Vec<String>,

        #[command(flatten)]
        profile: ProfileArgs,

        #[arg(short = 'r', long, help = "Descend into subdirectories")]
        recursive: bool,

        #[arg(
            short = 's',
            long,
            value_enum,
            default_value_t = StoreKind::Dir,
            env = "SNAPURL_STORE",
            help = "Where uploaded objects go"
        )]
        store: StoreKind,

        #[arg(
            short = 'o',
            long,
            default_value = "snapurl-uploads",
            env = "SNAPURL_OUT_DIR",
            help = "Target directory for the dir store"
        )]
        out_dir: PathBuf,

        #[arg(
            long,
            env = "SNAPURL_PUBLIC_BASE_URL",
            help = "Base URL that serves --out-dir",
            long_help = "Base URL under which --out-dir is served. Without it the dir store hands out file:// URLs."
        )]
        public_base_url: Option<String>,

        #[arg(
            short = 'a',
            long,
            env = "SNAPURL_AGGREGATOR_URL",
            help = "Custom Walrus aggregator URL",
            long_help = "Override default aggregator URL. \
                         Default: https://aggregator.walrus-testnet.walrus.space"
        )]
        aggregator_url: Option<String>,

        #[arg(
            short = 'p',
            long,
            env = "SNAPURL_PUBLISHER_URL",
            help = "Custom Walrus publisher URL",
            long_help = "Override default publisher URL. \
                         Default: https://publisher.walrus-testnet.walrus.space"
        )]
        publisher_url: Option<String>,

        #[arg(
            short = 'e',
            long,
            help = "Walrus storage duration in epochs (default: 10)",
            long_help = "Number of epochs to store each blob. Each epoch is approximately 24 hours."
        )]
        epochs: Option<u64>,

        #[arg(
            short = 't',
            long,
            help = "Store on Walrus for a single epoch (about 24 hours)",
            long_help = "Temporary storage (1 epoch). Overrides --epochs. Useful for quick sharing."
        )]
        temp: bool,

        #[arg(
            long,
            env = "SNAPURL_METADATA",
            help = "Append a JSON line per upload to this file"
        )]
        metadata: Option<PathBuf>,

        #[arg(
            long,
            requires = "metadata",
            help = "Keep uploads whose metadata could not be written",
            long_help = "By default an upload counts as failed when its metadata record cannot be written. \
                         With this flag the error is logged and the upload is kept."
        )]
        best_effort_metadata: bool,

        #[arg(short = 'c', long, help = "Copy the last URL to the clipboard")]
        copy: bool,

        #[arg(long, help = "Print the final items as JSON instead of text")]
        json: bool,
    },

    #[command(
        about = "Compress a single image without uploading it",
        long_about = "Run one image through a compression profile and write the result to disk. \
                      Useful to preview what `upload` would store."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path")]
        output: PathBuf,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    #[command(about = "List the built-in compression profiles")]
    Profiles,
}
