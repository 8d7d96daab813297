use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct KpiTileProps {
    pub label: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub id: Option<AttrValue>,
}

#[function_component(KpiTile)]
pub fn kpi_tile(props: &KpiTileProps) -> Html {
    html! {
        <div class="kpi">
            <div class="kpi-label">{props.label.clone()}</div>
            <div class="kpi-value" id={props.id.clone()}>{props.value.clone()}</div>
        </div>
    }
}
