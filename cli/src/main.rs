use clap::{Args, CommandFactory, Parser, Subcommand};
use cli::handlers::{ProblemArgs, handle_describe, handle_list, handle_run};
use gemm_adaptor::DataType;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Problem {
    /// Registered kernel name
    #[arg(long, default_value = gemm_adaptor::backends::common::kernel::gemm::DEFAULT_KERNEL_NAME)]
    kernel: String,
    /// Element type: f32, f16 or bf16
    #[arg(long, default_value = "f32")]
    dtype: DataType,
    /// Rows of the output
    #[arg(short)]
    m: u32,
    /// Columns of the output
    #[arg(short)]
    n: u32,
    /// Reduction dimension
    #[arg(short)]
    k: u32,
    /// Index of the argument holding the output slice offset
    #[arg(long)]
    slice: Option<usize>,
    /// JSON device description, the built-in reference device when omitted
    #[arg(long)]
    device: Option<String>,
}

impl From<Problem> for ProblemArgs {
    fn from(problem: Problem) -> Self {
        Self {
            kernel: problem.kernel,
            data_type: problem.dtype,
            m: problem.m,
            n: problem.n,
            k: problem.k,
            slice: problem.slice,
            device_path: problem.device,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List registered GEMM kernel variants
    List,
    /// Print launch geometry and packed parameters for a problem
    Describe {
        #[command(flatten)]
        problem: Problem,
    },
    /// Run a problem on the host reference device
    Run {
        #[command(flatten)]
        problem: Problem,
        /// Value every lhs element is set to
        #[arg(long, default_value_t = 1.0)]
        lhs: f32,
        /// Value every rhs element is set to
        #[arg(long, default_value_t = 1.0)]
        rhs: f32,
    },
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::List) => handle_list(),
        Some(Commands::Describe {
            problem,
        }) => handle_describe(problem.into()),
        Some(Commands::Run {
            problem,
            lhs,
            rhs,
        }) => handle_run(problem.into(), lhs, rhs),
        None => {
            let mut cmd = Cli::command();
            cmd.print_help().map_err(Into::into)
        },
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
