// 该文件是 Fengyan （烽烟） 项目的一部分。
// src/task.rs - 推理任务循环
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{
  sync::{
    Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
  thread,
  time::Duration,
};
use tracing::{info, warn};

use crate::{
  model::Model,
  output::Render,
  pipeline::{OverlaySlot, Pipeline},
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(
    self,
    input: I,
    model: M,
    pipeline: &Pipeline,
    output: O,
  ) -> Result<(), Self::Error>;
}

pub struct OneShotTask;

impl<
  F,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Error = ME>,
  O: Render<F, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: I,
    model: M,
    pipeline: &Pipeline,
    output: O,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let now = std::time::Instant::now();
    let tensor = model.infer(&frame)?;
    let result = pipeline.process(tensor.view())?;
    let elapsed = now.elapsed();
    info!("推理完成，检测到 {} 个目标，耗时: {:.2?}", result.len(), elapsed);
    output.render_result(&frame, &result, pipeline.labels())?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static HANDLER_INSTALLED: Mutex<bool> = Mutex::new(false);

/// 进程内只注册一次 Ctrl-C 处理，之后运行的任务共用同一个中断标志
///
/// 若宿主程序已自行注册 `ctrlc` 处理，这里返回 `ctrlc::Error::MultipleHandlers`。
fn interrupt_flag() -> Result<&'static AtomicBool, ctrlc::Error> {
  let mut installed = HANDLER_INSTALLED
    .lock()
    .unwrap_or_else(PoisonError::into_inner);
  if !*installed {
    ctrlc::set_handler(|| {
      info!("收到中断信号，准备退出...");
      INTERRUPTED.store(true, Ordering::SeqCst);
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    })?;
    *installed = true;
  }
  Ok(&INTERRUPTED)
}

/// 逐帧处理直到输入耗尽、达到指定帧数或收到 Ctrl-C
///
/// 后处理失败的帧只记录警告并跳过，仍计入帧数。
#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  slot: Option<OverlaySlot>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 每帧结果同时发布到交接槽，供显示线程读取
  pub fn with_slot(mut self, slot: OverlaySlot) -> Self {
    self.slot = Some(slot);
    self
  }
}

impl<
  F,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Error = ME>,
  O: Render<F, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: I,
    model: M,
    pipeline: &Pipeline,
    output: O,
  ) -> Result<(), Self::Error> {
    info!("开始任务...");
    let interrupted = interrupt_flag()?;
    interrupted.store(false, Ordering::SeqCst);

    let mut frame_index = 0usize;
    let mut now = std::time::Instant::now();
    for frame in input {
      frame_index = frame_index.wrapping_add(1);
      info!("处理第 {} 帧图像", frame_index);

      let tensor = model.infer(&frame)?;
      // 形状错误只影响当前帧
      match pipeline.process(tensor.view()) {
        Ok(result) => {
          let elapsed_a = now.elapsed();
          output.render_result(&frame, &result, pipeline.labels())?;
          let elapsed_b = now.elapsed();
          info!("推理完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);

          if let Some(slot) = &self.slot {
            slot.publish(result);
          }
        }
        Err(e) => warn!("第 {} 帧后处理失败，跳过: {}", frame_index, e),
      }
      now = std::time::Instant::now();

      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if interrupted.load(Ordering::SeqCst) {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("任务完成，退出");
    Ok(())
  }
}
