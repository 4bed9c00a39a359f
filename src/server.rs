use crate::codec::{Codec, EncodingSteps};
use crate::config::{Config, ObjectiveConfig, ProblemConfig, RunConfig};
use crate::export::SolveReport;
use crate::interfaces::Silent;
use crate::{Error, Solver};
use axum::http::{Method, StatusCode};
use axum::{
    extract::Query,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// HTTP API 响应类型
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiResponse<T> {
    #[serde(rename = "success")]
    Success { result: T },
    #[serde(rename = "error")]
    Error { error: String },
}

impl<T, E: ToString> From<Result<T, E>> for ApiResponse<T> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(result) => Self::Success { result },
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }
}

/// 求解参数，沿用网页表单的字段名
#[derive(Debug, Clone, Deserialize)]
pub struct SolveQuery {
    #[serde(rename = "N")]
    pub population_size: usize,
    pub a: f64,
    pub b: f64,
    pub d: u8,
    #[serde(rename = "Pk")]
    pub crossover_probability: f64,
    #[serde(rename = "Pm")]
    pub mutation_probability: f64,
    #[serde(rename = "epoki")]
    pub epochs: usize,
    pub seed: Option<u64>,
}

impl From<SolveQuery> for Config {
    fn from(query: SolveQuery) -> Self {
        Config {
            problem: ProblemConfig {
                lower_bound: query.a,
                upper_bound: query.b,
                precision: query.d,
                objective: ObjectiveConfig::Default,
            },
            run: RunConfig {
                population_size: query.population_size,
                epochs: query.epochs,
                crossover_probability: query.crossover_probability,
                mutation_probability: query.mutation_probability,
                seed: query.seed,
            },
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodeQuery {
    pub a: f64,
    pub b: f64,
    pub d: u8,
    pub x: f64,
}

/// 在阻塞线程上完成一次求解
pub async fn solve(config: Config) -> ApiResponse<SolveReport> {
    let result = tokio::task::spawn_blocking(move || {
        let Config { problem, run, .. } = config;
        let mut solver = Solver::from_config(&problem, run.seed).map_err(|e| e.to_string())?;
        let history = solver
            .solve_with(&run, &Silent)
            .map_err(|e| e.to_string())?;
        Ok::<_, String>(SolveReport::new(history))
    })
    .await;
    match result {
        Ok(report) => report.into(),
        Err(e) => {
            info!("求解任务崩溃: {:?}", e);
            ApiResponse::Error {
                error: format!("任务崩溃: {e:?}"),
            }
        }
    }
}

/// HTTP API: 按查询参数求解
pub async fn solve_query(Query(query): Query<SolveQuery>) -> Json<ApiResponse<SolveReport>> {
    info!("GET /api/solve");
    Json(solve(query.into()).await)
}

/// HTTP API: 按配置求解
pub async fn solve_config(Json(config): Json<Config>) -> Json<ApiResponse<SolveReport>> {
    info!("POST /api/solve");
    Json(solve(config).await)
}

/// HTTP API: 验证配置
pub async fn validate_config(Json(config): Json<serde_json::Value>) -> Json<ApiResponse<Config>> {
    info!("POST /api/validate");
    let result = serde_json::from_value::<Config>(config)
        .map_err(Error::from)
        .and_then(|config| {
            let ProblemConfig {
                lower_bound,
                upper_bound,
                precision,
                ..
            } = config.problem;
            Codec::new(lower_bound, upper_bound, precision)?;
            Ok(config)
        });
    Json(result.into())
}

/// HTTP API: 展示编码过程
pub async fn encode(Query(query): Query<EncodeQuery>) -> Json<ApiResponse<EncodingSteps>> {
    info!("GET /api/encode");
    let result = Codec::new(query.a, query.b, query.d).and_then(|codec| codec.explain(query.x));
    Json(result.into())
}

/// 主页面
pub async fn index() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>evolalg API 服务器</title>
    <meta charset="utf-8">
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        code { background: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
        label { display: inline-block; width: 60px; }
        pre { background: #f9f9f9; padding: 15px; border-radius: 5px; overflow-x: auto; }
    </style>
</head>
<body>
    <h1>evolalg API 服务器</h1>

    <h2>HTTP API 端点</h2>
    <ul>
        <li><code>GET /api/solve?N=&amp;a=&amp;b=&amp;d=&amp;Pk=&amp;Pm=&amp;epoki=</code> - 按查询参数求解</li>
        <li><code>POST /api/solve</code> - 按配置求解</li>
        <li><code>POST /api/validate</code> - 验证配置</li>
        <li><code>GET /api/encode?a=&amp;b=&amp;d=&amp;x=</code> - 展示编码过程</li>
    </ul>

    <h2>求解</h2>
    <form id="form">
        <p><label>N</label><input name="N" value="50"></p>
        <p><label>a</label><input name="a" value="-2"></p>
        <p><label>b</label><input name="b" value="3"></p>
        <p><label>d</label><input name="d" value="3"></p>
        <p><label>Pk</label><input name="Pk" value="0.75"></p>
        <p><label>Pm</label><input name="Pm" value="0.005"></p>
        <p><label>epoki</label><input name="epoki" value="100"></p>
        <button type="submit">求解</button>
    </form>

    <h3>每一代的 fmin / favg / fmax：</h3>
    <pre id="output"></pre>

    <script>
        document.getElementById('form').onsubmit = async (event) => {
            event.preventDefault();
            const params = new URLSearchParams(new FormData(event.target));
            const response = await fetch(`/api/solve?${params}`);
            const result = await response.json();
            const output = document.getElementById('output');
            if (result.type === 'success') {
                output.textContent = result.result.series
                    .map(s => `${s.epoch}\t${s.min.toFixed(6)}\t${s.avg.toFixed(6)}\t${s.max.toFixed(6)}\t${s.elite}`)
                    .join('\n');
            } else {
                output.textContent = `错误: ${result.error}`;
            }
        };
    </script>
</body>
</html>
    "#,
    )
}

/// 创建应用路由
pub fn create_app() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/solve", get(solve_query).post(solve_config))
        .route("/api/validate", post(validate_config))
        .route("/api/encode", get(encode))
        .fallback_service(ServeDir::new("static"))
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(600),
        ))
}

/// 尝试绑定可用端口
async fn bind_available_port(
    preferred_port: u16,
) -> Result<(tokio::net::TcpListener, u16), Error> {
    match tokio::net::TcpListener::bind(("0.0.0.0", preferred_port)).await {
        Ok(listener) => {
            info!("成功绑定到首选端口: {}", preferred_port);
            return Ok((listener, preferred_port));
        }
        Err(e) => {
            info!("端口 {} 已被占用: {}", preferred_port, e);
        }
    }

    // 如果首选端口被占用，尝试之后的端口
    for port in (preferred_port.saturating_add(1)..=u16::MAX).take(50) {
        if let Ok(listener) = tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
            info!("成功绑定到替代端口: {}", port);
            return Ok((listener, port));
        }
    }

    // 最后尝试让系统自动分配端口
    let listener = tokio::net::TcpListener::bind("0.0.0.0:0").await?;
    let actual_port = listener.local_addr()?.port();
    info!("使用系统自动分配的端口: {}", actual_port);
    Ok((listener, actual_port))
}

/// 启动服务器
pub async fn start_server(port: u16) -> Result<(), Error> {
    let app = create_app();

    let (listener, actual_port) = bind_available_port(port).await?;

    info!("Listening on: http://127.0.0.1:{}", actual_port);
    info!("API Endpoints:");
    info!("   GET  /api/solve       - 按查询参数求解");
    info!("   POST /api/solve       - 按配置求解");
    info!("   POST /api/validate    - 验证配置");
    info!("   GET  /api/encode      - 展示编码过程");

    axum::serve(listener, app).await?;

    Ok(())
}
