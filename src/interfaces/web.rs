use crate::codec::Codec;
use crate::config::Config;
use crate::export::SolveReport;
use crate::interfaces::{Interface, Message};
use crate::Solver;
#[cfg(feature = "console_error_panic_hook")]
use console_error_panic_hook::set_once;
use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::{prelude::*, JsError};

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_once() {}

/// 通过图形界面来使用 evolalg 的入口，实现了界面特征
#[wasm_bindgen]
pub struct Web {
    callback: Function,
    config: Config,
}

/// 用于在图形界面验证输入的配置是否正确
#[wasm_bindgen]
pub fn validate(js_config: JsValue) -> Result<JsValue, JsError> {
    set_once();
    let config: Config = from_value(js_config)?;
    Codec::new(
        config.problem.lower_bound,
        config.problem.upper_bound,
        config.problem.precision,
    )?;
    let serializer = Serializer::json_compatible();
    Ok(config.serialize(&serializer)?)
}

#[wasm_bindgen]
impl Web {
    pub fn new(callback: Function) -> Web {
        set_once();
        Self {
            callback,
            config: Config::default(),
        }
    }

    pub fn sync(&mut self, js_config: JsValue) -> Result<(), JsError> {
        self.config = from_value(js_config)?;
        Ok(())
    }

    pub fn encode(&self, value: f64) -> Result<JsValue, JsError> {
        let problem = &self.config.problem;
        let codec = Codec::new(problem.lower_bound, problem.upper_bound, problem.precision)?;
        let serializer = Serializer::json_compatible();
        Ok(codec.explain(value)?.serialize(&serializer)?)
    }

    pub fn solve(&self) -> Result<JsValue, JsError> {
        let Config { problem, run, .. } = self.config.clone();
        let mut solver = Solver::from_config(&problem, run.seed)?;
        let history = solver.solve_with(&run, self)?;
        let serializer = Serializer::json_compatible();
        Ok(SolveReport::new(history).serialize(&serializer)?)
    }
}

impl Interface for Web {
    fn post(&self, message: Message) {
        let serializer = Serializer::json_compatible();
        let js_message = message.serialize(&serializer).unwrap();
        self.callback.call1(&JsValue::null(), &js_message).unwrap();
    }
}
