use carview_core::{Action, Phase, RenderContext, RenderMode, SkyboxVariant};

//
// ──────────────────────────────────────────────────────────────
//   HUD overlay
//
//   Read-only view of the RenderContext. Anything the user
//   changes comes back as Actions, applied by the app like
//   keyboard input.
// ──────────────────────────────────────────────────────────────
//

pub fn draw(ui_ctx: &egui::Context, ctx: &RenderContext) -> Vec<Action>
{
  let mut actions = Vec::new();

  egui::Window::new("Carview").default_pos([12.0, 12.0]).resizable(false).show(ui_ctx, |ui| {
    camera_section(ui, ctx);
    ui.separator();
    flythrough_section(ui, ctx, &mut actions);
    ui.separator();
    scene_section(ui, ctx, &mut actions);
  });

  actions
}

pub fn phase_label(phase: Phase, waypoint_count: usize) -> String
{
  match phase
  {
    Phase::Idle => "idle".to_string(),
    Phase::Approaching(i) => format!("waypoint {} / {}", i + 1, waypoint_count),
    Phase::Done => "done".to_string(),
  }
}

fn camera_section(ui: &mut egui::Ui, ctx: &RenderContext)
{
  let camera = &ctx.camera;
  let p = camera.position();
  let t = camera.target();

  egui::Grid::new("camera_readout").num_columns(2).show(ui, |ui| {
    ui.label("Position");
    ui.monospace(format!("{:8.1} {:8.1} {:8.1}", p.x, p.y, p.z));
    ui.end_row();

    ui.label("Target");
    ui.monospace(format!("{:8.1} {:8.1} {:8.1}", t.x, t.y, t.z));
    ui.end_row();

    ui.label("Yaw / pitch");
    ui.monospace(format!("{:.1}° / {:.1}°", camera.yaw(), camera.pitch()));
    ui.end_row();

    ui.label("FOV");
    ui.monospace(format!("{:.1}°", camera.fov()));
    ui.end_row();
  });
}

fn flythrough_section(ui: &mut egui::Ui, ctx: &RenderContext, actions: &mut Vec<Action>)
{
  let flythrough = &ctx.flythrough;

  ui.horizontal(|ui| {
    ui.label("Flythrough:");
    ui.strong(phase_label(flythrough.phase(), flythrough.waypoints().len()));
  });

  ui.horizontal(|ui| {
    if ui.button("Start").clicked()
    {
      actions.push(Action::StartFlythrough);
    }

    if ui.add_enabled(flythrough.is_active(), egui::Button::new("Stop")).clicked()
    {
      actions.push(Action::CancelFlythrough);
    }
  });
}

fn scene_section(ui: &mut egui::Ui, ctx: &RenderContext, actions: &mut Vec<Action>)
{
  // The flythrough ignores these anyway; grey them out so that is visible.
  ui.add_enabled_ui(!ctx.is_animating(), |ui| {
    let settings = &ctx.settings;

    let mut fog = settings.fog;
    if ui.checkbox(&mut fog, "Fog").changed()
    {
      actions.push(Action::SetFog(fog));
    }

    let mut point_light = settings.point_light;
    if ui.checkbox(&mut point_light, "Camera light").changed()
    {
      actions.push(Action::SetPointLight(point_light));
    }

    let mut shadows = settings.shadows;
    if ui.checkbox(&mut shadows, "Shadows").changed()
    {
      actions.push(Action::SetShadows(shadows));
    }

    let mut mode = settings.render_mode;
    ui.horizontal(|ui| {
      ui.radio_value(&mut mode, RenderMode::Fill, "Fill");
      ui.radio_value(&mut mode, RenderMode::Wireframe, "Wireframe");
      ui.radio_value(&mut mode, RenderMode::Points, "Points");
    });
    if mode != settings.render_mode
    {
      actions.push(Action::SetRenderMode(mode));
    }

    let mut sky = settings.skybox;
    ui.horizontal(|ui| {
      ui.radio_value(&mut sky, SkyboxVariant::Day, "Day");
      ui.radio_value(&mut sky, SkyboxVariant::Night, "Night");
    });
    if sky != settings.skybox
    {
      actions.push(Action::SetSkybox(sky));
    }

    ui.label(format!("Scene spin: {:.0}°", settings.model_angle));
  });
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn phase_labels_count_from_one()
  {
    assert_eq!(phase_label(Phase::Idle, 10), "idle");
    assert_eq!(phase_label(Phase::Approaching(0), 10), "waypoint 1 / 10");
    assert_eq!(phase_label(Phase::Approaching(9), 10), "waypoint 10 / 10");
    assert_eq!(phase_label(Phase::Done, 10), "done");
  }

  #[test]
  fn untouched_hud_emits_nothing()
  {
    use carview_core::{Camera, Speeds};
    use glam::Vec3;

    let camera = Camera::new(Vec3::new(0.0, 100.0, 3.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 50.0, 0.0));
    let ctx = RenderContext::new(camera, Speeds::default());
    let ui_ctx = egui::Context::default();

    let mut actions = Vec::new();
    let _ = ui_ctx.run(egui::RawInput::default(), |ui_ctx| {
      actions = draw(ui_ctx, &ctx);
    });

    assert!(actions.is_empty());
  }
}
